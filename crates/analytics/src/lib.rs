//! # Cryptolens Analytics Engine
//!
//! This crate turns a raw price/volume series into an enriched table of
//! technical indicators plus scalar risk summaries.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It performs no I/O and has
//!   no knowledge of where the series came from. It depends only on
//!   `core-types` and `configuration`.
//! - **Copy-on-write transforms:** Every transform takes a `&TimeSeries` and
//!   returns a new one with columns appended; the caller's series is never
//!   mutated, so repeated calls are idempotent.
//! - **Explicit absence:** warm-up cells and undefined ratios are `None`,
//!   never a sentinel float.
//!
//! ## Public API
//!
//! - `IndicatorPipeline`: applies a configured selection of transforms.
//! - The individual transforms (`add_moving_averages`, `add_rsi`, ...).
//! - `calculate_sharpe_ratio`, `calculate_max_drawdown`, `return_statistics`.
//! - `PriceAlert`: checks the latest price against a target.
//! - `AnalyticsEngine` / `AnalysisReport`: the one-call facade used by the CLI.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod alert;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod summary;
pub mod window;

// Re-export the key components to create a clean, public-facing API.
pub use alert::{ALERT_WARNING_RATIO, AlertStatus, PriceAlert};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use indicators::{
    add_bollinger_bands, add_macd, add_moving_averages, add_rolling_volatility, add_rsi,
};
pub use pipeline::{Indicator, IndicatorPipeline};
pub use report::AnalysisReport;
pub use stats::{
    ReturnStatistics, calculate_max_drawdown, calculate_sharpe_ratio, drawdown_series,
    return_statistics,
};
pub use summary::{SeriesSummary, normalize_to};
pub use window::{RollingWindow, ema, rolling_mean, rolling_std};
