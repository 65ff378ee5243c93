use crate::error::ApiError;
use async_trait::async_trait;
use configuration::MarketDataSettings;
use core_types::{CoinInfo, TimeSeries};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub mod cache;
pub mod error;
pub mod responses;
// --- Public API ---
pub use cache::CachedSource;
pub use responses::{CoinInfoResponse, CoinMarketData, MarketChartResponse, parse_market_chart};

/// One market chart query. Also the key of the fetch cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketChartRequest {
    /// CoinGecko coin id, e.g. `bitcoin`.
    pub coin_id: String,
    pub vs_currency: String,
    /// Lookback window in days.
    pub days: u32,
}

impl MarketChartRequest {
    pub fn new(coin_id: impl Into<String>, vs_currency: impl Into<String>, days: u32) -> Self {
        Self {
            coin_id: coin_id.into(),
            vs_currency: vs_currency.into(),
            days,
        }
    }
}

/// The abstract interface for a source of historical market data.
/// The CLI only talks to this trait, so the live client can be wrapped in a
/// cache or replaced by a mock in tests.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches the price/volume history described by `request`.
    async fn fetch_market_chart(&self, request: &MarketChartRequest)
    -> Result<TimeSeries, ApiError>;

    /// Fetches the current market snapshot of `coin_id`, quoted in `vs_currency`.
    async fn fetch_coin_info(&self, coin_id: &str, vs_currency: &str)
    -> Result<CoinInfo, ApiError>;
}

/// A client for the public CoinGecko REST API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(settings: &MarketDataSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("cryptolens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn market_chart_url(&self, coin_id: &str) -> String {
        format!("{}/coins/{}/market_chart", self.base_url, coin_id)
    }

    fn coin_url(&self, coin_id: &str) -> String {
        format!("{}/coins/{}", self.base_url, coin_id)
    }

    /// Sends a GET and decodes a successful body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::ApiError(format!(
                "GET {} returned {}: {}",
                url, status, text
            )));
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn fetch_market_chart(
        &self,
        request: &MarketChartRequest,
    ) -> Result<TimeSeries, ApiError> {
        let url = self.market_chart_url(&request.coin_id);
        let days = request.days.to_string();
        tracing::debug!(%url, vs_currency = %request.vs_currency, days, "requesting market chart");

        let body: MarketChartResponse = self
            .get_json(
                &url,
                &[
                    ("vs_currency", request.vs_currency.as_str()),
                    ("days", days.as_str()),
                ],
            )
            .await?;
        parse_market_chart(&body)
    }

    async fn fetch_coin_info(&self, coin_id: &str, vs_currency: &str) -> Result<CoinInfo, ApiError> {
        let url = self.coin_url(coin_id);
        tracing::debug!(%url, "requesting coin info");

        let body: CoinInfoResponse = self
            .get_json(
                &url,
                &[
                    ("localization", "false"),
                    ("tickers", "false"),
                    ("community_data", "false"),
                    ("developer_data", "false"),
                ],
            )
            .await?;
        Ok(body.into_coin_info(vs_currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_coin() {
        let settings = MarketDataSettings {
            base_url: "https://example.test/api/v3/".to_string(),
            ..MarketDataSettings::default()
        };
        let client = CoinGeckoClient::new(&settings).unwrap();
        assert_eq!(
            client.market_chart_url("bitcoin"),
            "https://example.test/api/v3/coins/bitcoin/market_chart"
        );
        assert_eq!(client.coin_url("bitcoin"), "https://example.test/api/v3/coins/bitcoin");
    }

    #[test]
    fn requests_are_cache_keys() {
        use std::collections::HashSet;
        let a = MarketChartRequest::new("bitcoin", "usd", 90);
        let b = MarketChartRequest::new("bitcoin", "usd", 30);
        let set: HashSet<_> = [a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
