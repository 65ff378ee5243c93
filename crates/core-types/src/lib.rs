//! # Cryptolens Core Types
//!
//! Layer 0 of the workspace: the plain data structures exchanged between the
//! data collaborator, the analytics engine, the forecaster and the front end.
//! No logic beyond construction-time validation lives here.

pub mod coin;
pub mod error;
pub mod forecast;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use coin::CoinInfo;
pub use forecast::{FitDiagnostics, ForecastPoint, ForecastResult, ForecastSummary};
pub use series::{Column, Observation, RESERVED_COLUMNS, TimeSeries};
