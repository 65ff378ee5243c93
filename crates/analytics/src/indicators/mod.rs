// =============================================================================
// Indicator Pipeline transforms
// =============================================================================
//
// Pure, copy-on-write transforms over a `TimeSeries`. Each one reads only the
// raw `price` / `return` columns and hands back a new series with its derived
// columns appended, so any subset can be applied in any order.
//
// Warm-up cells are `None`, never zero or extrapolated.

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod volatility;

pub use bollinger::add_bollinger_bands;
pub use macd::add_macd;
pub use moving_average::add_moving_averages;
pub use rsi::add_rsi;
pub use volatility::add_rolling_volatility;

use crate::error::AnalyticsError;

/// Rejects a zero window.
pub(crate) fn require_window(name: &str, window: usize) -> Result<(), AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::invalid(name, "window must be at least 1"));
    }
    Ok(())
}

/// Rejects a series shorter than `required`.
pub(crate) fn require_len(indicator: &str, required: usize, actual: usize) -> Result<(), AnalyticsError> {
    if actual < required {
        return Err(AnalyticsError::insufficient(indicator, required, actual));
    }
    Ok(())
}
