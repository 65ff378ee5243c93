use crate::error::ApiError;
use chrono::{TimeZone, Utc};
use core_types::{CoinInfo, Observation, TimeSeries};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Body of `GET /coins/{id}/market_chart`.
///
/// Each entry is `[timestamp_ms, value]`. Other fields CoinGecko returns
/// (such as `market_caps`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
    #[serde(default)]
    pub total_volumes: Vec<[f64; 2]>,
}

impl MarketChartResponse {
    pub fn from_json(text: &str) -> Result<Self, ApiError> {
        serde_json::from_str(text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Body of `GET /coins/{id}`, reduced to the fields the analysis reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfoResponse {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub market_data: Option<CoinMarketData>,
}

/// Figures keyed by quote currency are maps such as `{"usd": 1.3e12}`.
/// CoinGecko reports `null` for figures it does not track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_30d: Option<f64>,
}

impl CoinInfoResponse {
    pub fn from_json(text: &str) -> Result<Self, ApiError> {
        serde_json::from_str(text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Picks the `vs_currency` figures out of the response.
    pub fn into_coin_info(self, vs_currency: &str) -> CoinInfo {
        let market = self.market_data.unwrap_or_default();
        let quoted = |values: &HashMap<String, Option<f64>>| {
            values.get(vs_currency).copied().flatten()
        };
        CoinInfo {
            current_price: quoted(&market.current_price),
            market_cap: quoted(&market.market_cap),
            change_24h: market.price_change_percentage_24h,
            change_7d: market.price_change_percentage_7d,
            change_30d: market.price_change_percentage_30d,
            vs_currency: vs_currency.to_string(),
            id: self.id,
            symbol: self.symbol,
            name: self.name,
        }
    }
}

/// Builds a `TimeSeries` from a market chart body.
///
/// Prices and volumes are inner-joined on their timestamp and sorted
/// ascending. When a timestamp repeats, the last entry wins.
///
/// # Errors
///
/// `ApiError::InvalidData` when no timestamp carries both a price and a
/// volume, a timestamp is out of range, or a value fails series validation.
pub fn parse_market_chart(response: &MarketChartResponse) -> Result<TimeSeries, ApiError> {
    let prices = keyed_by_millis(&response.prices)?;
    let volumes = keyed_by_millis(&response.total_volumes)?;

    let observations = prices
        .into_iter()
        .filter_map(|(ms, price)| volumes.get(&ms).map(|&volume| (ms, price, volume)))
        .map(|(ms, price, volume)| {
            let timestamp = Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", ms)))?;
            Ok(Observation::new(timestamp, price, volume))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    if observations.is_empty() {
        return Err(ApiError::InvalidData(
            "market chart has no timestamps with both a price and a volume".to_string(),
        ));
    }
    let dropped = response.prices.len().saturating_sub(observations.len());
    if dropped > 0 {
        tracing::debug!(dropped, "discarded unmatched or duplicate price points");
    }

    TimeSeries::from_observations(observations).map_err(|e| ApiError::InvalidData(e.to_string()))
}

fn keyed_by_millis(points: &[[f64; 2]]) -> Result<BTreeMap<i64, f64>, ApiError> {
    let mut keyed = BTreeMap::new();
    for &[ms, value] in points {
        if !ms.is_finite() {
            return Err(ApiError::InvalidData(format!("Invalid timestamp: {}", ms)));
        }
        keyed.insert(ms.round() as i64, value);
    }
    Ok(keyed)
}
