use crate::error::AnalyticsError;
use crate::pipeline::IndicatorPipeline;
use crate::report::AnalysisReport;
use crate::stats::{calculate_max_drawdown, calculate_sharpe_ratio, return_statistics};
use crate::summary::SeriesSummary;
use configuration::Settings;
use core_types::TimeSeries;

/// A stateless calculator that enriches a series and derives its summaries.
///
/// Holds no per-call state, so one engine can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    pipeline: IndicatorPipeline,
    risk_free_rate: f64,
}

impl AnalyticsEngine {
    pub fn new(pipeline: IndicatorPipeline, risk_free_rate: f64) -> Self {
        Self {
            pipeline,
            risk_free_rate,
        }
    }

    /// Builds an engine with every indicator from the application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            IndicatorPipeline::new(settings.indicators.clone()),
            settings.statistics.risk_free_rate,
        )
    }

    /// The main entry point for analysing a series.
    ///
    /// # Arguments
    ///
    /// * `series` - The raw price/volume series, oldest observation first.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalysisReport` or an `AnalyticsError`.
    pub fn calculate(&self, series: &TimeSeries) -> Result<AnalysisReport, AnalyticsError> {
        let enriched = self.pipeline.apply(series)?;

        let summary = SeriesSummary::from_series(&enriched)
            .ok_or_else(|| AnalyticsError::insufficient("summary", 1, 0))?;

        let report = AnalysisReport {
            sharpe_ratio: calculate_sharpe_ratio(&enriched, self.risk_free_rate),
            max_drawdown: calculate_max_drawdown(&enriched),
            return_statistics: return_statistics(&enriched),
            summary,
            enriched,
        };
        tracing::debug!(
            rows = report.enriched.len(),
            sharpe = report.sharpe_ratio,
            max_drawdown = ?report.max_drawdown,
            "analysis complete"
        );
        Ok(report)
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
