use crate::indicators::rsi::RSI_COLUMN;
use core_types::TimeSeries;
use serde::{Deserialize, Serialize};

/// Headline reductions of a series, shared by every front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub current_price: f64,
    pub period_high: f64,
    pub period_low: f64,
    /// `last / first - 1`.
    pub total_return: f64,
    pub average_volume: f64,
    /// Latest RSI, when the series carries a defined `rsi` cell at its end.
    pub current_rsi: Option<f64>,
}

impl SeriesSummary {
    /// Returns `None` for an empty series.
    pub fn from_series(series: &TimeSeries) -> Option<Self> {
        let prices = series.prices();
        let first = *prices.first()?;
        let last = *prices.last()?;
        let volumes = series.volumes();

        Some(Self {
            current_price: last,
            period_high: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            period_low: prices.iter().copied().fold(f64::INFINITY, f64::min),
            total_return: last / first - 1.0,
            average_volume: volumes.iter().sum::<f64>() / volumes.len() as f64,
            current_rsi: series.latest(RSI_COLUMN),
        })
    }
}

/// Rescales a comparison series so that its first price equals `base_price`.
///
/// Used to overlay two assets on the same axis.
pub fn normalize_to(series: &TimeSeries, base_price: f64) -> Vec<f64> {
    let Some(&first) = series.prices().first() else {
        return Vec::new();
    };
    series
        .prices()
        .iter()
        .map(|p| p / first * base_price)
        .collect()
}
