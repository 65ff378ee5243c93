use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an empty (or missing)
/// `config.toml` yields a fully usable configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub indicators: IndicatorSettings,
    pub statistics: StatisticsSettings,
    pub forecast: ForecastSettings,
    pub market_data: MarketDataSettings,
    pub logging: LoggingSettings,
}

/// Window and span parameters for the indicator pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorSettings {
    /// One `ma_<w>` column is produced per window.
    pub ma_windows: Vec<usize>,
    /// Trailing window of the return standard deviation.
    pub volatility_window: usize,
    pub rsi_window: usize,
    pub bb_window: usize,
    /// Width of the Bollinger Bands in standard deviations.
    pub bb_num_std: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

/// Parameters for the scalar summaries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatisticsSettings {
    /// Annual risk-free rate used for the Sharpe ratio (0.02 = 2%).
    pub risk_free_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub enabled: bool,
    /// Number of future days to forecast.
    pub horizon: usize,
}

/// Settings for the market-data collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketDataSettings {
    pub base_url: String,
    pub vs_currency: String,
    /// Default lookback window in days.
    pub days: u32,
    /// Maximum number of distinct requests kept in the fetch cache.
    pub cache_capacity: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_windows: vec![7, 30],
            volatility_window: 30,
            rsi_window: 14,
            bb_window: 20,
            bb_num_std: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            horizon: 30,
        }
    }
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            days: 90,
            cache_capacity: 32,
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    /// Checks the cross-field and range constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;

        let rate = self.statistics.risk_free_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "statistics.risk_free_rate must be a non-negative number, got {}",
                rate
            )));
        }
        if self.forecast.horizon == 0 {
            return Err(ConfigError::ValidationError(
                "forecast.horizon must be at least 1 day".to_string(),
            ));
        }
        if self.market_data.cache_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "market_data.cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.market_data.days == 0 {
            return Err(ConfigError::ValidationError(
                "market_data.days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ma_windows.iter().any(|&w| w == 0) {
            return Err(ConfigError::ValidationError(
                "indicators.ma_windows must not contain 0".to_string(),
            ));
        }
        let windows = [
            ("indicators.volatility_window", self.volatility_window),
            ("indicators.rsi_window", self.rsi_window),
            ("indicators.bb_window", self.bb_window),
            ("indicators.macd_fast", self.macd_fast),
            ("indicators.macd_slow", self.macd_slow),
            ("indicators.macd_signal", self.macd_signal),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(ConfigError::ValidationError(format!("{} must be at least 1", name)));
        }
        // Both are sample standard deviations.
        if self.volatility_window < 2 || self.bb_window < 2 {
            return Err(ConfigError::ValidationError(
                "indicators.volatility_window and indicators.bb_window must be at least 2"
                    .to_string(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::ValidationError(format!(
                "indicators.macd_fast ({}) must be smaller than indicators.macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !self.bb_num_std.is_finite() || self.bb_num_std < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "indicators.bb_num_std must be a non-negative number, got {}",
                self.bb_num_std
            )));
        }
        Ok(())
    }
}
