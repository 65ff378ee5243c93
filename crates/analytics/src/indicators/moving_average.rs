use super::{require_len, require_window};
use crate::error::AnalyticsError;
use crate::window::rolling_mean;
use core_types::TimeSeries;

/// Name of the moving-average column for `window`.
pub fn ma_column(window: usize) -> String {
    format!("ma_{}", window)
}

/// Appends one `ma_<w>` column per window: the simple mean of the trailing
/// `w` prices. The first `w - 1` cells are absent.
///
/// # Errors
///
/// - `InvalidParameter` for a zero window.
/// - `InsufficientData` when the series is shorter than a window.
pub fn add_moving_averages(
    series: &TimeSeries,
    windows: &[usize],
) -> Result<TimeSeries, AnalyticsError> {
    let mut columns = Vec::with_capacity(windows.len());
    for &w in windows {
        let name = ma_column(w);
        require_window(&name, w)?;
        require_len(&name, w, series.len())?;
        let values = rolling_mean(series.prices().iter().copied().map(Some), w);
        columns.push((name, values));
    }
    Ok(series.with_columns(columns)?)
}
