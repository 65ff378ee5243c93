use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One future step of a price forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    /// Point estimate.
    pub price: f64,
    pub lower: f64,
    pub upper: f64,
}

/// How the model behind a forecast was fitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    /// Akaike information criterion of the fitted model.
    pub aic: f64,
    /// Optimizer iterations the fit took.
    pub iterations: usize,
}

/// The output of a forecast request.
///
/// Created fresh for every request and never mutated afterwards; it is a
/// pure function of the input series and the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// `(p, d, q)` of the fitted model.
    pub order: (usize, usize, usize),
    /// Two-sided coverage of the `lower`/`upper` bounds (e.g. 0.95).
    pub confidence: f64,
    pub diagnostics: FitDiagnostics,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point estimate at the end of the horizon.
    pub fn end_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }
}

/// Headline view of a forecast against the last observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub current_price: f64,
    pub forecast_price: f64,
    /// Fractional change from `current_price` to `forecast_price`.
    pub change: f64,
    /// Days forecast.
    pub horizon: usize,
}

impl ForecastSummary {
    /// `None` for an empty forecast or a non-positive current price.
    pub fn new(current_price: f64, result: &ForecastResult) -> Option<Self> {
        if !current_price.is_finite() || current_price <= 0.0 {
            return None;
        }
        let forecast_price = result.end_price()?;
        Some(Self {
            current_price,
            forecast_price,
            change: forecast_price / current_price - 1.0,
            horizon: result.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn result(prices: &[f64]) -> ForecastResult {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        ForecastResult {
            order: (2, 1, 2),
            confidence: 0.95,
            diagnostics: FitDiagnostics {
                aic: 100.0,
                iterations: 42,
            },
            points: prices
                .iter()
                .zip(1..)
                .map(|(&price, day)| ForecastPoint {
                    timestamp: start + Duration::days(day),
                    price,
                    lower: price - 1.0,
                    upper: price + 1.0,
                })
                .collect(),
        }
    }

    #[test]
    fn summary_compares_end_of_horizon_with_current_price() {
        let summary = ForecastSummary::new(200.0, &result(&[205.0, 210.0, 250.0])).unwrap();
        assert_eq!(summary.forecast_price, 250.0);
        assert_eq!(summary.change, 0.25);
        assert_eq!(summary.horizon, 3);
    }

    #[test]
    fn summary_needs_points_and_a_positive_price() {
        assert!(ForecastSummary::new(200.0, &result(&[])).is_none());
        assert!(ForecastSummary::new(0.0, &result(&[1.0])).is_none());
    }
}
