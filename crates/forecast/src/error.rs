use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient data to fit the model: {reason} (need {required}, got {actual})")]
    InsufficientData {
        required: usize,
        actual: usize,
        reason: String,
    },

    #[error("Model fitting failed: {0}")]
    ModelFit(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Series error: {0}")]
    Series(#[from] CoreError),
}

impl ForecastError {
    /// The series cannot support the model, as opposed to a failed fit.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData { .. })
    }

    pub fn is_model_fit(&self) -> bool {
        matches!(self, ForecastError::ModelFit(_))
    }
}
