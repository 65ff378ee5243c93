//! # Cryptolens Forecast
//!
//! Fits a fixed ARIMA(2,1,2) model to a price history and projects it forward
//! day by day with normal confidence bounds.
//!
//! Fitting is CPU-bound and blocking; async callers should run it on a
//! blocking thread.

pub mod arima;
pub mod error;
pub mod optimizer;
pub mod transform;

pub use arima::{CONFIDENCE_LEVEL, FittedArima, ForecastStep, MIN_OBSERVATIONS};
pub use error::ForecastError;

use arima::{AR_ORDER, DIFF_ORDER, MA_ORDER};
use chrono::Duration;
use core_types::{FitDiagnostics, ForecastPoint, ForecastResult, TimeSeries};

/// `(p, d, q)` of the model every forecast uses.
pub const ORDER: (usize, usize, usize) = (AR_ORDER, DIFF_ORDER, MA_ORDER);

/// Forecasts `horizon` daily prices past the end of `series`.
///
/// The returned points are stamped `last + 1 day, ..., last + horizon days`.
///
/// # Errors
///
/// * `InvalidParameter` for a zero horizon.
/// * `InsufficientData` for a short or degenerate price history.
/// * `ModelFit` when the likelihood optimization fails.
pub fn forecast_prices(
    series: &TimeSeries,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter {
            name: "horizon".to_string(),
            reason: "must be at least one day".to_string(),
        });
    }

    let model = FittedArima::fit(series.prices())?;
    let last = series
        .last_timestamp()
        .ok_or_else(|| ForecastError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: 0,
            reason: "series is empty".to_string(),
        })?;

    let points = model
        .forecast(horizon)?
        .into_iter()
        .zip(1..)
        .map(|(step, day)| ForecastPoint {
            timestamp: last + Duration::days(day),
            price: step.price,
            lower: step.lower,
            upper: step.upper,
        })
        .collect();

    tracing::info!(
        horizon,
        observations = series.len(),
        aic = model.aic(),
        iterations = model.iterations(),
        "price forecast complete"
    );

    Ok(ForecastResult {
        order: ORDER,
        confidence: CONFIDENCE_LEVEL,
        diagnostics: FitDiagnostics {
            aic: model.aic(),
            iterations: model.iterations(),
        },
        points,
    })
}
