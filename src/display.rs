//! Terminal rendering of reports with `comfy-table`.

use analytics::{
    AlertStatus, AnalysisReport, PriceAlert, ReturnStatistics, SeriesSummary,
    calculate_max_drawdown, calculate_sharpe_ratio, normalize_to,
};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use core_types::{CoinInfo, ForecastResult, ForecastSummary, TimeSeries};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn right_align_from(table: &mut Table, first: usize) {
    let count = table.column_count();
    for index in first..count {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn optional(value: Option<f64>, render: fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| "n/a".to_string())
}

pub fn summary_table(coin: &str, report: &AnalysisReport) -> Table {
    let s = &report.summary;
    let mut table = new_table(vec!["Metric", coin]);
    table
        .add_row(vec!["Current Price".to_string(), money(s.current_price)])
        .add_row(vec!["Period High".to_string(), money(s.period_high)])
        .add_row(vec!["Period Low".to_string(), money(s.period_low)])
        .add_row(vec!["Total Return".to_string(), percent(s.total_return)])
        .add_row(vec!["Sharpe Ratio".to_string(), format!("{:.2}", report.sharpe_ratio)])
        .add_row(vec!["Max Drawdown".to_string(), optional(report.max_drawdown, percent)])
        .add_row(vec!["Avg Daily Volume".to_string(), format!("${:.0}", s.average_volume)])
        .add_row(vec![
            "Current RSI".to_string(),
            optional(s.current_rsi, |v| format!("{:.1}", v)),
        ]);
    right_align_from(&mut table, 1);
    table
}

/// Live snapshot figures. Changes arrive in percent already.
pub fn coin_info_table(info: &CoinInfo) -> Table {
    let change = |v: f64| format!("{:+.2}%", v);
    let title = format!("{} ({})", info.name, info.symbol.to_uppercase());
    let mut table = new_table(vec![title.as_str(), info.vs_currency.to_uppercase().as_str()]);
    table
        .add_row(vec!["Spot Price".to_string(), optional(info.current_price, money)])
        .add_row(vec![
            "Market Cap".to_string(),
            optional(info.market_cap, |v| format!("${:.2}B", v / 1e9)),
        ])
        .add_row(vec!["24h Change".to_string(), optional(info.change_24h, change)])
        .add_row(vec!["7d Change".to_string(), optional(info.change_7d, change)])
        .add_row(vec!["30d Change".to_string(), optional(info.change_30d, change)]);
    right_align_from(&mut table, 1);
    table
}

pub fn alert_message(coin: &str, alert: &PriceAlert, current_price: f64) -> String {
    match alert.evaluate(current_price) {
        AlertStatus::Reached => format!(
            "ALERT: {} has reached {} (target {})",
            coin,
            money(current_price),
            money(alert.target())
        ),
        AlertStatus::Approaching => format!(
            "{} is at {}, within 5% of the alert target {}",
            coin,
            money(current_price),
            money(alert.target())
        ),
        AlertStatus::Below => format!(
            "WARNING: {} is at {}, still below the alert target {}",
            coin,
            money(current_price),
            money(alert.target())
        ),
    }
}

pub fn return_statistics_table(stats: &ReturnStatistics) -> Table {
    let mut table = new_table(vec!["Daily Returns", "Value"]);
    table
        .add_row(vec!["Observations".to_string(), stats.count.to_string()])
        .add_row(vec!["Mean".to_string(), percent(stats.mean)])
        .add_row(vec!["Std Dev".to_string(), optional(stats.std_dev, percent)])
        .add_row(vec![
            "Skewness".to_string(),
            optional(stats.skewness, |v| format!("{:.3}", v)),
        ])
        .add_row(vec![
            "Kurtosis".to_string(),
            optional(stats.kurtosis, |v| format!("{:.3}", v)),
        ])
        .add_row(vec!["Min".to_string(), percent(stats.min)])
        .add_row(vec!["Max".to_string(), percent(stats.max)]);
    right_align_from(&mut table, 1);
    table
}

/// Latest defined value of every derived column.
pub fn indicator_table(enriched: &TimeSeries) -> Table {
    let mut table = new_table(vec!["Indicator", "Latest"]);
    for name in enriched.column_names() {
        table.add_row(vec![
            name.to_string(),
            optional(enriched.latest(name), |v| format!("{:.4}", v)),
        ]);
    }
    right_align_from(&mut table, 1);
    table
}

/// One coin's line in the side-by-side comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub coin: String,
    pub first_price: f64,
    pub summary: SeriesSummary,
    pub sharpe_ratio: f64,
    pub max_drawdown: Option<f64>,
    /// Last price after rebasing the first price onto the shared base.
    pub rebased_price: Option<f64>,
}

impl ComparisonRow {
    /// `None` for an empty series.
    pub fn from_series(
        coin: &str,
        series: &TimeSeries,
        risk_free_rate: f64,
        base_price: f64,
    ) -> Option<Self> {
        Some(Self {
            coin: coin.to_string(),
            first_price: *series.prices().first()?,
            summary: SeriesSummary::from_series(series)?,
            sharpe_ratio: calculate_sharpe_ratio(series, risk_free_rate),
            max_drawdown: calculate_max_drawdown(series),
            rebased_price: normalize_to(series, base_price).last().copied(),
        })
    }
}

pub fn comparison_table<'a>(rows: impl IntoIterator<Item = &'a ComparisonRow>) -> Table {
    let mut table = new_table(vec![
        "Coin",
        "First Price",
        "Last Price",
        "Total Return",
        "Sharpe",
        "Max Drawdown",
        "Rebased Last",
    ]);
    for row in rows {
        let s = &row.summary;
        table.add_row(vec![
            row.coin.clone(),
            money(row.first_price),
            money(s.current_price),
            percent(s.total_return),
            format!("{:.2}", row.sharpe_ratio),
            optional(row.max_drawdown, percent),
            optional(row.rebased_price, money),
        ]);
    }
    right_align_from(&mut table, 1);
    table
}

pub fn forecast_table(coin: &str, result: &ForecastResult) -> Table {
    let (p, d, q) = result.order;
    let level = result.confidence * 100.0;
    let lower = format!("Lower {:.0}%", level);
    let upper = format!("Upper {:.0}%", level);
    let title = format!("{} ARIMA({},{},{})", coin, p, d, q);
    let mut table = new_table(vec![title.as_str(), "Forecast", lower.as_str(), upper.as_str()]);
    for point in &result.points {
        table.add_row(vec![
            point.timestamp.format("%Y-%m-%d").to_string(),
            money(point.price),
            money(point.lower),
            money(point.upper),
        ]);
    }
    right_align_from(&mut table, 1);
    table
}

pub fn forecast_summary_table(summary: &ForecastSummary, result: &ForecastResult) -> Table {
    let mut table = new_table(vec!["Forecast Summary", "Value"]);
    table
        .add_row(vec!["Current Price".to_string(), money(summary.current_price)])
        .add_row(vec![
            "Forecasted Price".to_string(),
            format!("{} ({:+.2}%)", money(summary.forecast_price), summary.change * 100.0),
        ])
        .add_row(vec!["Forecast Horizon".to_string(), format!("{} days", summary.horizon)])
        .add_row(vec!["Model AIC".to_string(), format!("{:.2}", result.diagnostics.aic)])
        .add_row(vec![
            "Optimizer Iterations".to_string(),
            result.diagnostics.iterations.to_string(),
        ]);
    right_align_from(&mut table, 1);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_message_matches_status() {
        let alert = PriceAlert::new(100.0).unwrap();
        assert!(alert_message("bitcoin", &alert, 120.0).starts_with("ALERT: bitcoin has reached $120.00"));
        assert!(alert_message("bitcoin", &alert, 97.0).contains("within 5%"));
        assert!(alert_message("bitcoin", &alert, 80.0).starts_with("WARNING:"));
    }
}
