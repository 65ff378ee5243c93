use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid time series: {0}")]
    InvalidSeries(String),

    #[error("Column '{name}' has {actual} values but the series has {expected} observations")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column name '{0}' is reserved for a raw column")]
    ReservedColumn(String),
}
