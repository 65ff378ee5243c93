use crate::error::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Below this fraction of the target the alert warns that the price is
/// still well short of it.
pub const ALERT_WARNING_RATIO: f64 = 0.95;

/// Where the current price stands relative to an alert target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    /// The price is at or above the target.
    Reached,
    /// Within 5% below the target.
    Approaching,
    /// More than 5% below the target.
    Below,
}

/// A price target to check the latest price against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    target: f64,
}

impl PriceAlert {
    /// # Errors
    ///
    /// `InvalidParameter` when `target` is not a finite positive price.
    pub fn new(target: f64) -> Result<Self, AnalyticsError> {
        if !target.is_finite() || target <= 0.0 {
            return Err(AnalyticsError::invalid(
                "alert_price",
                format!("must be a positive price, got {}", target),
            ));
        }
        Ok(Self { target })
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn evaluate(&self, current_price: f64) -> AlertStatus {
        if current_price >= self.target {
            AlertStatus::Reached
        } else if current_price < self.target * ALERT_WARNING_RATIO {
            AlertStatus::Below
        } else {
            AlertStatus::Approaching
        }
    }
}
