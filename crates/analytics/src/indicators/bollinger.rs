// =============================================================================
// Bollinger Bands
// =============================================================================
//
//   bb_middle = trailing mean of price over `window`
//   bb_upper  = bb_middle + num_std * trailing sample std of price
//   bb_lower  = bb_middle - num_std * trailing sample std of price

use super::{require_len, require_window};
use crate::error::AnalyticsError;
use crate::window::{rolling_mean, rolling_std};
use core_types::TimeSeries;

pub const BB_MIDDLE_COLUMN: &str = "bb_middle";
pub const BB_UPPER_COLUMN: &str = "bb_upper";
pub const BB_LOWER_COLUMN: &str = "bb_lower";

/// Appends `bb_middle`, `bb_upper` and `bb_lower`. The first `window - 1`
/// cells of each are absent.
pub fn add_bollinger_bands(
    series: &TimeSeries,
    window: usize,
    num_std: f64,
) -> Result<TimeSeries, AnalyticsError> {
    require_window(BB_MIDDLE_COLUMN, window)?;
    if window < 2 {
        return Err(AnalyticsError::invalid(
            "bb_window",
            "a sample standard deviation needs a window of at least 2",
        ));
    }
    if !num_std.is_finite() || num_std < 0.0 {
        return Err(AnalyticsError::invalid(
            "num_std",
            format!("must be a non-negative number, got {}", num_std),
        ));
    }
    require_len(BB_MIDDLE_COLUMN, window, series.len())?;

    let prices = || series.prices().iter().copied().map(Some);
    let middle = rolling_mean(prices(), window);
    let std = rolling_std(prices(), window);

    let (upper, lower): (Vec<_>, Vec<_>) = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip();

    Ok(series.with_columns([
        (BB_MIDDLE_COLUMN.to_string(), middle),
        (BB_UPPER_COLUMN.to_string(), upper),
        (BB_LOWER_COLUMN.to_string(), lower),
    ])?)
}
