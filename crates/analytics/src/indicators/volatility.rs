use super::{require_len, require_window};
use crate::error::AnalyticsError;
use crate::window::rolling_std;
use core_types::TimeSeries;

pub const VOLATILITY_COLUMN: &str = "rolling_volatility";

/// Appends `rolling_volatility`: the sample standard deviation of the
/// trailing `window` returns.
///
/// The first return is absent, so the window needs `window + 1` observations
/// and the first `window` cells are absent.
pub fn add_rolling_volatility(
    series: &TimeSeries,
    window: usize,
) -> Result<TimeSeries, AnalyticsError> {
    require_window(VOLATILITY_COLUMN, window)?;
    if window < 2 {
        return Err(AnalyticsError::invalid(
            VOLATILITY_COLUMN,
            "a sample standard deviation needs a window of at least 2",
        ));
    }
    require_len(VOLATILITY_COLUMN, window + 1, series.len())?;

    let values = rolling_std(series.returns().iter().copied(), window);
    Ok(series.with_column(VOLATILITY_COLUMN, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{series, wavy};
    use crate::window::sample_std;
    use approx::assert_relative_eq;

    #[test]
    fn volatility_is_std_of_trailing_returns() {
        let ts = add_rolling_volatility(&series(&wavy(50)), 30).unwrap();
        let returns: Vec<f64> = ts.returns().iter().skip(1).map(|r| r.unwrap()).collect();
        let col = ts.column(VOLATILITY_COLUMN).unwrap();

        assert!(col[..30].iter().all(Option::is_none));
        for i in 30..50 {
            let window = &returns[i - 30..i];
            assert_relative_eq!(col[i].unwrap(), sample_std(window).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_returns_have_exactly_zero_volatility() {
        // Doubling prices give a return of exactly 1.0 everywhere.
        let prices: Vec<f64> = (0..40).map(|i| 100.0 * 2f64.powi(i)).collect();
        let ts = add_rolling_volatility(&series(&prices), 30).unwrap();
        let col = ts.column(VOLATILITY_COLUMN).unwrap();
        assert!(col[30..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn needs_window_plus_one_observations() {
        let err = add_rolling_volatility(&series(&wavy(30)), 30).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::InsufficientData { required: 31, actual: 30, .. }
        ));
        assert!(add_rolling_volatility(&series(&wavy(31)), 30).is_ok());
    }

    #[test]
    fn window_of_one_is_rejected() {
        assert!(matches!(
            add_rolling_volatility(&series(&wavy(10)), 1),
            Err(AnalyticsError::InvalidParameter { .. })
        ));
    }
}
