use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data for {indicator}: requires at least {required} observations, got {actual}")]
    InsufficientData {
        indicator: String,
        required: usize,
        actual: usize,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Series error: {0}")]
    Series(#[from] CoreError),
}

impl AnalyticsError {
    pub(crate) fn insufficient(indicator: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            indicator: indicator.into(),
            required,
            actual,
        }
    }

    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
