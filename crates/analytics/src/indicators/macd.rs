// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd           = EMA(price, fast) - EMA(price, slow)
//   macd_signal    = EMA(macd, signal)
//   macd_histogram = macd - macd_signal
//
// The EMAs are recursive and seeded with the first value, so every cell is
// defined from the first observation onward.

use crate::error::AnalyticsError;
use core_types::TimeSeries;
use ta::Next;
use ta::indicators::MovingAverageConvergenceDivergence as Macd;

pub const MACD_COLUMN: &str = "macd";
pub const MACD_SIGNAL_COLUMN: &str = "macd_signal";
pub const MACD_HISTOGRAM_COLUMN: &str = "macd_histogram";

/// Appends `macd`, `macd_signal` and `macd_histogram`.
///
/// # Errors
///
/// - `InvalidParameter` for a zero span or `fast >= slow`.
/// - `InsufficientData` for an empty series.
pub fn add_macd(
    series: &TimeSeries,
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<TimeSeries, AnalyticsError> {
    if fast >= slow {
        return Err(AnalyticsError::invalid(
            "macd_fast",
            format!("fast span ({}) must be smaller than slow span ({})", fast, slow),
        ));
    }
    let mut macd = Macd::new(fast, slow, signal).map_err(|e| {
        AnalyticsError::invalid("macd", format!("failed to initialize MACD: {:?}", e))
    })?;
    if series.is_empty() {
        return Err(AnalyticsError::insufficient(MACD_COLUMN, 1, 0));
    }

    let len = series.len();
    let mut line = Vec::with_capacity(len);
    let mut signal_line = Vec::with_capacity(len);
    let mut histogram = Vec::with_capacity(len);
    for &price in series.prices() {
        let out = macd.next(price);
        line.push(Some(out.macd));
        signal_line.push(Some(out.signal));
        histogram.push(Some(out.histogram));
    }

    Ok(series.with_columns([
        (MACD_COLUMN.to_string(), line),
        (MACD_SIGNAL_COLUMN.to_string(), signal_line),
        (MACD_HISTOGRAM_COLUMN.to_string(), histogram),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{series, wavy};
    use crate::window::ema;
    use approx::assert_relative_eq;

    #[test]
    fn histogram_is_macd_minus_signal() {
        let ts = add_macd(&series(&wavy(80)), 12, 26, 9).unwrap();
        let macd = ts.column(MACD_COLUMN).unwrap();
        let signal = ts.column(MACD_SIGNAL_COLUMN).unwrap();
        let hist = ts.column(MACD_HISTOGRAM_COLUMN).unwrap();
        for i in 0..80 {
            assert_eq!(hist[i].unwrap(), macd[i].unwrap() - signal[i].unwrap());
        }
    }

    #[test]
    fn macd_line_is_difference_of_emas() {
        let prices = wavy(60);
        let ts = add_macd(&series(&prices), 12, 26, 9).unwrap();
        let fast = ema(&prices, 12);
        let slow = ema(&prices, 26);
        let macd = ts.column(MACD_COLUMN).unwrap();
        for i in 0..prices.len() {
            assert_relative_eq!(macd[i].unwrap(), fast[i] - slow[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn defined_from_first_observation() {
        let ts = add_macd(&series(&[42.0, 43.0]), 12, 26, 9).unwrap();
        // Both EMAs start at the first price, so the first MACD is zero.
        assert_eq!(ts.column(MACD_COLUMN).unwrap()[0], Some(0.0));
        assert_eq!(ts.column(MACD_HISTOGRAM_COLUMN).unwrap()[0], Some(0.0));
    }

    #[test]
    fn rejects_bad_spans() {
        let ts = series(&wavy(30));
        assert!(matches!(add_macd(&ts, 26, 12, 9), Err(AnalyticsError::InvalidParameter { .. })));
        assert!(matches!(add_macd(&ts, 0, 26, 9), Err(AnalyticsError::InvalidParameter { .. })));
        assert!(matches!(add_macd(&ts, 12, 26, 0), Err(AnalyticsError::InvalidParameter { .. })));
    }
}
