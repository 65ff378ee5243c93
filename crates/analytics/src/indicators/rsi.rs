// =============================================================================
// Relative Strength Index (RSI), simple-average variant
// =============================================================================
//
//   delta_i  = price_i - price_{i-1}          (absent at i = 0)
//   gain_i   = max(delta_i, 0)
//   loss_i   = max(-delta_i, 0)
//   avg_gain = trailing simple mean of gain over `window`
//   avg_loss = trailing simple mean of loss over `window`
//   RSI      = 100 - 100 / (1 + avg_gain / avg_loss)
//
// The first delta is absent, so the first `window` cells are absent.

use super::{require_len, require_window};
use crate::error::AnalyticsError;
use crate::window::rolling_mean;
use core_types::TimeSeries;

pub const RSI_COLUMN: &str = "rsi";

/// Appends the `rsi` column.
///
/// # Edge cases
/// - `avg_loss == 0` with gains saturates to 100.
/// - A window with neither gains nor losses is absent (0/0 is undefined).
/// - Fewer than `window + 1` observations => `InsufficientData`.
pub fn add_rsi(series: &TimeSeries, window: usize) -> Result<TimeSeries, AnalyticsError> {
    require_window(RSI_COLUMN, window)?;
    require_len(RSI_COLUMN, window + 1, series.len())?;

    let prices = series.prices();
    let deltas: Vec<Option<f64>> = std::iter::once(None)
        .chain(prices.windows(2).map(|w| Some(w[1] - w[0])))
        .take(prices.len())
        .collect();

    let gains = rolling_mean(deltas.iter().map(|d| d.map(|d| d.max(0.0))), window);
    let losses = rolling_mean(deltas.iter().map(|d| d.map(|d| (-d).max(0.0))), window);

    let values = gains
        .into_iter()
        .zip(losses)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect();

    Ok(series.with_column(RSI_COLUMN, values)?)
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        // Infinite ratio saturates; no movement at all is undefined.
        return (avg_gain > 0.0).then_some(100.0);
    }
    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{series, wavy};
    use approx::assert_relative_eq;

    #[test]
    fn first_window_cells_are_absent() {
        let ts = add_rsi(&series(&wavy(30)), 14).unwrap();
        let col = ts.column(RSI_COLUMN).unwrap();
        assert!(col[..14].iter().all(Option::is_none));
        assert!(col[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_stays_in_range() {
        let prices = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let ts = add_rsi(&series(&prices), 14).unwrap();
        for v in ts.column(RSI_COLUMN).unwrap().iter().flatten() {
            assert!((0.0..=100.0).contains(v), "RSI {v} out of range");
        }
    }

    #[test]
    fn all_gains_saturate_to_100() {
        let prices: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let ts = add_rsi(&series(&prices), 14).unwrap();
        for v in ts.column(RSI_COLUMN).unwrap()[14..].iter() {
            assert_eq!(*v, Some(100.0));
        }
    }

    #[test]
    fn all_losses_give_zero() {
        let prices: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let ts = add_rsi(&series(&prices), 14).unwrap();
        for v in ts.column(RSI_COLUMN).unwrap()[14..].iter() {
            assert_eq!(*v, Some(0.0));
        }
    }

    #[test]
    fn flat_window_is_absent() {
        let ts = add_rsi(&series(&[100.0; 20]), 14).unwrap();
        assert!(ts.column(RSI_COLUMN).unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn matches_hand_computed_value() {
        // Deltas over the last 3-window: +2, -1, +1 => avg gain 1, avg loss 1/3.
        let ts = add_rsi(&series(&[10.0, 12.0, 11.0, 12.0]), 3).unwrap();
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert_relative_eq!(ts.latest(RSI_COLUMN).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn needs_window_plus_one_points() {
        let err = add_rsi(&series(&wavy(14)), 14).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData { required: 15, actual: 14, .. }
        ));
    }
}
