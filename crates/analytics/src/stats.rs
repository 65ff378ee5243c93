//! Scalar summaries of the return series.
//!
//! These never fail: degenerate inputs map to documented fallback values
//! (`0.0` for the Sharpe ratio, `None` for undefined moments or drawdowns).

use crate::window::{mean, sample_std};
use core_types::TimeSeries;
use serde::{Deserialize, Serialize};

/// Observations per year used to annualize daily statistics.
pub const PERIODS_PER_YEAR: f64 = 365.0;

/// Annualized Sharpe ratio of the present returns.
///
/// `sqrt(365) * mean(excess) / std(excess)` with `excess = return - rate / 365`
/// and a sample standard deviation.
///
/// Returns `0.0` when there are fewer than two returns or when the excess
/// returns have zero standard deviation.
pub fn calculate_sharpe_ratio(series: &TimeSeries, risk_free_rate: f64) -> f64 {
    let daily_rate = risk_free_rate / PERIODS_PER_YEAR;
    let excess: Vec<f64> = series
        .returns()
        .iter()
        .flatten()
        .map(|r| r - daily_rate)
        .collect();

    let (Some(mean), Some(std)) = (mean(&excess), sample_std(&excess)) else {
        return 0.0;
    };
    if std == 0.0 {
        return 0.0;
    }
    PERIODS_PER_YEAR.sqrt() * mean / std
}

/// Drawdown of the cumulative wealth index from its running peak.
///
/// Wealth starts at 1.0 on the first observation and compounds by each
/// present return; an absent return carries wealth forward unchanged.
/// Returns an empty vector for series with at most one observation.
pub fn drawdown_series(series: &TimeSeries) -> Vec<f64> {
    if series.len() <= 1 {
        return Vec::new();
    }

    let mut wealth = 1.0_f64;
    let mut peak = 1.0_f64;
    series
        .returns()
        .iter()
        .map(|r| {
            if let Some(r) = r {
                wealth *= 1.0 + r;
            }
            peak = peak.max(wealth);
            (wealth - peak) / peak
        })
        .collect()
}

/// The most negative drawdown, or `None` when the drawdown series is empty.
pub fn calculate_max_drawdown(series: &TimeSeries) -> Option<f64> {
    drawdown_series(series).into_iter().reduce(f64::min)
}

/// Descriptive statistics of the present returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; needs two returns.
    pub std_dev: Option<f64>,
    /// Adjusted Fisher-Pearson skewness; needs three returns and non-zero variance.
    pub skewness: Option<f64>,
    /// Bias-corrected excess kurtosis; needs four returns and non-zero variance.
    pub kurtosis: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Computes [`ReturnStatistics`], or `None` when the series has no returns.
pub fn return_statistics(series: &TimeSeries) -> Option<ReturnStatistics> {
    let returns: Vec<f64> = series.returns().iter().flatten().copied().collect();
    let mean = mean(&returns)?;
    let n = returns.len() as f64;

    let central = |k: i32| returns.iter().map(|r| (r - mean).powi(k)).sum::<f64>() / n;
    let m2 = central(2);
    let m3 = central(3);
    let m4 = central(4);

    let skewness = (returns.len() >= 3 && m2 > 0.0).then(|| {
        let g1 = m3 / m2.powf(1.5);
        (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
    });
    let kurtosis = (returns.len() >= 4 && m2 > 0.0).then(|| {
        let g2 = m4 / (m2 * m2) - 3.0;
        (n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0)
    });

    Some(ReturnStatistics {
        count: returns.len(),
        mean,
        std_dev: sample_std(&returns),
        skewness,
        kurtosis,
        min: returns.iter().copied().fold(f64::INFINITY, f64::min),
        max: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}
