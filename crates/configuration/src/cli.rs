use crate::error::ConfigError;
use crate::settings::Settings;
use clap::Args;

/// Command-line overrides that take precedence over `config.toml` and the
/// environment. Flatten this into a `clap` command.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsOverrides {
    /// Annual risk-free rate for the Sharpe ratio (e.g. 0.02).
    #[arg(long, global = true)]
    pub risk_free_rate: Option<f64>,

    /// RSI window in observations.
    #[arg(long, global = true)]
    pub rsi_window: Option<usize>,

    /// Rolling volatility window in observations.
    #[arg(long, global = true)]
    pub volatility_window: Option<usize>,

    /// Moving-average windows, comma separated (e.g. 7,30).
    #[arg(long, global = true, value_delimiter = ',')]
    pub ma_windows: Option<Vec<usize>>,

    /// Quote currency for market data (e.g. usd).
    #[arg(long, global = true)]
    pub vs_currency: Option<String>,
}

impl SettingsOverrides {
    /// Applies every provided flag and re-validates the result.
    pub fn apply(&self, mut settings: Settings) -> Result<Settings, ConfigError> {
        if let Some(rate) = self.risk_free_rate {
            settings.statistics.risk_free_rate = rate;
        }
        if let Some(w) = self.rsi_window {
            settings.indicators.rsi_window = w;
        }
        if let Some(w) = self.volatility_window {
            settings.indicators.volatility_window = w;
        }
        if let Some(windows) = &self.ma_windows {
            settings.indicators.ma_windows = windows.clone();
        }
        if let Some(currency) = &self.vs_currency {
            settings.market_data.vs_currency = currency.clone();
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_settings() {
        let base = Settings::default();
        let applied = SettingsOverrides::default().apply(base.clone()).unwrap();
        assert_eq!(applied, base);
    }

    #[test]
    fn overrides_replace_values_and_validate() {
        let overrides = SettingsOverrides {
            risk_free_rate: Some(0.05),
            ma_windows: Some(vec![10, 50]),
            ..Default::default()
        };
        let applied = overrides.apply(Settings::default()).unwrap();
        assert_eq!(applied.statistics.risk_free_rate, 0.05);
        assert_eq!(applied.indicators.ma_windows, vec![10, 50]);

        let bad = SettingsOverrides {
            rsi_window: Some(0),
            ..Default::default()
        };
        assert!(bad.apply(Settings::default()).is_err());
    }
}
