use crate::stats::ReturnStatistics;
use crate::summary::SeriesSummary;
use core_types::TimeSeries;
use serde::{Deserialize, Serialize};

/// Everything the engine derives from one input series.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object handed to presentation and export collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The input series plus every indicator column.
    pub enriched: TimeSeries,

    // I. Headline reductions
    pub summary: SeriesSummary,

    // II. Risk
    pub sharpe_ratio: f64,
    pub max_drawdown: Option<f64>, // None when the series has a single observation

    // III. Distribution of returns
    pub return_statistics: Option<ReturnStatistics>, // None when there are no returns
}
