use crate::error::AnalyticsError;
use crate::indicators::{
    add_bollinger_bands, add_macd, add_moving_averages, add_rolling_volatility, add_rsi,
};
use configuration::IndicatorSettings;
use core_types::TimeSeries;
use serde::{Deserialize, Serialize};

/// The transforms the pipeline can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    MovingAverages,
    RollingVolatility,
    Rsi,
    BollingerBands,
    Macd,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::MovingAverages,
        Indicator::RollingVolatility,
        Indicator::Rsi,
        Indicator::BollingerBands,
        Indicator::Macd,
    ];
}

/// A configured selection of indicator transforms.
///
/// None of the transforms reads another's output, so the selection order
/// never changes the resulting table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPipeline {
    settings: IndicatorSettings,
    indicators: Vec<Indicator>,
}

impl IndicatorPipeline {
    /// A pipeline that applies every indicator.
    pub fn new(settings: IndicatorSettings) -> Self {
        Self::with_indicators(settings, Indicator::ALL)
    }

    /// A pipeline that applies only the given indicators. Duplicates are dropped.
    pub fn with_indicators(
        settings: IndicatorSettings,
        indicators: impl IntoIterator<Item = Indicator>,
    ) -> Self {
        let mut selected: Vec<Indicator> = Vec::new();
        for indicator in indicators {
            if !selected.contains(&indicator) {
                selected.push(indicator);
            }
        }
        Self {
            settings,
            indicators: selected,
        }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// Applies the selected transforms and returns the enriched series.
    /// The input is left untouched.
    pub fn apply(&self, series: &TimeSeries) -> Result<TimeSeries, AnalyticsError> {
        let mut enriched = series.clone();
        for &indicator in &self.indicators {
            enriched = self.apply_one(indicator, &enriched)?;
            tracing::debug!(?indicator, rows = enriched.len(), "applied indicator");
        }
        Ok(enriched)
    }

    fn apply_one(
        &self,
        indicator: Indicator,
        series: &TimeSeries,
    ) -> Result<TimeSeries, AnalyticsError> {
        let s = &self.settings;
        match indicator {
            Indicator::MovingAverages => add_moving_averages(series, &s.ma_windows),
            Indicator::RollingVolatility => add_rolling_volatility(series, s.volatility_window),
            Indicator::Rsi => add_rsi(series, s.rsi_window),
            Indicator::BollingerBands => add_bollinger_bands(series, s.bb_window, s.bb_num_std),
            Indicator::Macd => add_macd(series, s.macd_fast, s.macd_slow, s.macd_signal),
        }
    }
}

impl Default for IndicatorPipeline {
    fn default() -> Self {
        Self::new(IndicatorSettings::default())
    }
}
