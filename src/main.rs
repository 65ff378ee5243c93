mod display;
mod logging;

use analytics::{AnalyticsEngine, PriceAlert};
use anyhow::{Context, Result};
use api_client::{
    CachedSource, CoinGeckoClient, MarketChartRequest, MarketChartResponse, MarketDataSource,
    parse_market_chart,
};
use clap::{Parser, Subcommand};
use configuration::{Settings, SettingsOverrides};
use core_types::{CoinInfo, ForecastSummary, TimeSeries};
use futures::future::{join, try_join};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The main entry point for the Cryptolens market analysis tool.
#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional; its variables feed the CRYPTOLENS__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => configuration::load_settings_from(path),
        None => configuration::load_settings(),
    }
    .context("Failed to load configuration")?;
    let settings = cli
        .overrides
        .apply(settings)
        .context("Invalid command-line override")?;

    // Held until exit so buffered file logs are flushed.
    let _log_guard = logging::init(&settings.logging)?;

    let client = CoinGeckoClient::new(&settings.market_data)
        .context("Failed to build the market data client")?;
    let source = CachedSource::new(client, settings.market_data.cache_capacity);

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &settings, &source).await,
        Commands::Forecast(args) => handle_forecast(args, &settings, &source).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Cryptocurrency market analytics: technical indicators, risk summaries and
/// ARIMA price forecasts.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file to load instead of ./config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: SettingsOverrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a coin's price history with indicators and print its summaries.
    Analyze(AnalyzeArgs),
    /// Fit an ARIMA(2,1,2) model and forecast daily prices.
    Forecast(ForecastArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// CoinGecko coin id (e.g., "bitcoin").
    #[arg(long)]
    coin: String,

    /// Lookback window in days. Defaults to `market_data.days`.
    #[arg(long)]
    days: Option<u32>,

    /// A second coin id to compare against, fetched concurrently.
    #[arg(long)]
    compare: Option<String>,

    /// Read the primary coin from a saved market_chart JSON file instead of the API.
    /// Live coin info is skipped in this mode.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Report whether the latest price has reached this target.
    #[arg(long)]
    alert_price: Option<f64>,
}

#[derive(Parser)]
struct ForecastArgs {
    /// CoinGecko coin id (e.g., "bitcoin").
    #[arg(long)]
    coin: String,

    /// Lookback window in days. Defaults to `market_data.days`.
    #[arg(long)]
    days: Option<u32>,

    /// Number of days to forecast. Defaults to `forecast.horizon`.
    #[arg(long)]
    horizon: Option<usize>,

    /// Read the price history from a saved market_chart JSON file instead of the API.
    #[arg(long)]
    input: Option<PathBuf>,
}

// ==============================================================================
// Data Loading
// ==============================================================================

/// Loads a coin's history from `input` when given, otherwise from `source`.
async fn load_series<S: MarketDataSource>(
    source: &S,
    settings: &Settings,
    coin: &str,
    days: Option<u32>,
    input: Option<&Path>,
) -> Result<TimeSeries> {
    if let Some(path) = input {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let body = MarketChartResponse::from_json(&text)
            .with_context(|| format!("{} is not a market_chart response", path.display()))?;
        let series = parse_market_chart(&body)?;
        tracing::info!(path = %path.display(), rows = series.len(), "loaded offline market chart");
        return Ok(series);
    }

    let request = MarketChartRequest::new(
        coin,
        settings.market_data.vs_currency.as_str(),
        days.unwrap_or(settings.market_data.days),
    );
    let series = source
        .fetch_market_chart(&request)
        .await
        .with_context(|| format!("Failed to fetch market data for '{}'", coin))?;
    tracing::info!(coin, rows = series.len(), "fetched market chart");
    Ok(series)
}

/// Live snapshot for the header. A failure only costs the extra figures.
async fn load_coin_info<S: MarketDataSource>(
    source: &S,
    settings: &Settings,
    coin: &str,
) -> Option<CoinInfo> {
    match source
        .fetch_coin_info(coin, &settings.market_data.vs_currency)
        .await
    {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(coin, error = %e, "coin info unavailable, continuing without it");
            None
        }
    }
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_analyze<S: MarketDataSource>(
    args: AnalyzeArgs,
    settings: &Settings,
    source: &S,
) -> Result<()> {
    let alert = args
        .alert_price
        .map(PriceAlert::new)
        .transpose()
        .context("Invalid --alert-price")?;

    let histories = async {
        let primary = load_series(source, settings, &args.coin, args.days, args.input.as_deref());
        match &args.compare {
            Some(other) => {
                let secondary = load_series(source, settings, other, args.days, None);
                let (series, other_series) = try_join(primary, secondary).await?;
                Ok::<_, anyhow::Error>((series, Some((other.as_str(), other_series))))
            }
            None => Ok((primary.await?, None)),
        }
    };
    let info = async {
        if args.input.is_some() {
            None
        } else {
            load_coin_info(source, settings, &args.coin).await
        }
    };
    let (histories, info) = join(histories, info).await;
    let (series, comparison) = histories?;

    let engine = AnalyticsEngine::from_settings(settings);
    let report = engine
        .calculate(&series)
        .with_context(|| format!("Failed to analyze '{}'", args.coin))?;
    tracing::info!(coin = %args.coin, rows = report.enriched.len(), "analysis complete");

    println!("{}", display::summary_table(&args.coin, &report));
    if let Some(info) = &info {
        println!("{}", display::coin_info_table(info));
    }
    if let Some(alert) = &alert {
        println!(
            "{}",
            display::alert_message(&args.coin, alert, report.summary.current_price)
        );
    }
    if let Some(stats) = &report.return_statistics {
        println!("{}", display::return_statistics_table(stats));
    }
    println!("{}", display::indicator_table(&report.enriched));

    if let Some((other, other_series)) = comparison {
        let risk_free_rate = settings.statistics.risk_free_rate;
        // The comparison coin is rebased onto the primary coin's first price.
        let base_price = series.prices().first().copied().unwrap_or(report.summary.current_price);
        let rows = [
            display::ComparisonRow::from_series(&args.coin, &series, risk_free_rate, base_price),
            display::ComparisonRow::from_series(other, &other_series, risk_free_rate, base_price),
        ];
        println!("{}", display::comparison_table(rows.iter().flatten()));
    }
    Ok(())
}

async fn handle_forecast<S: MarketDataSource>(
    args: ForecastArgs,
    settings: &Settings,
    source: &S,
) -> Result<()> {
    if !settings.forecast.enabled {
        println!("Forecasting is disabled (forecast.enabled = false).");
        return Ok(());
    }
    let horizon = args.horizon.unwrap_or(settings.forecast.horizon);
    let series = load_series(source, settings, &args.coin, args.days, args.input.as_deref()).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!(
        "Fitting ARIMA(2,1,2) on {} observations...",
        series.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let current_price = series.prices().last().copied();
    let outcome = tokio::task::spawn_blocking(move || forecast::forecast_prices(&series, horizon))
        .await
        .context("Forecast task panicked")?;
    spinner.finish_and_clear();

    match outcome {
        Ok(result) => {
            tracing::info!(coin = %args.coin, horizon, "forecast complete");
            println!("{}", display::forecast_table(&args.coin, &result));
            if let Some(summary) = current_price.and_then(|p| ForecastSummary::new(p, &result)) {
                println!("{}", display::forecast_summary_table(&summary, &result));
            }
            Ok(())
        }
        Err(e) if e.is_insufficient_data() => Err(anyhow::Error::new(e).context(format!(
            "Not enough usable price history to forecast '{}'; try a longer --days window",
            args.coin
        ))),
        Err(e) if e.is_model_fit() => Err(anyhow::Error::new(e).context(format!(
            "The ARIMA model could not be fitted to '{}'",
            args.coin
        ))),
        Err(e) => Err(e.into()),
    }
}
