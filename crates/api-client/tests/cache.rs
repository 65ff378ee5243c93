use api_client::error::ApiError;
use api_client::{CachedSource, MarketChartRequest, MarketDataSource};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use core_types::{CoinInfo, Observation, TimeSeries};
use std::sync::Mutex;

/// Records every request it serves; coins named `broken` fail.
#[derive(Default)]
struct RecordingSource {
    calls: Mutex<Vec<String>>,
}

impl RecordingSource {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for RecordingSource {
    async fn fetch_market_chart(
        &self,
        request: &MarketChartRequest,
    ) -> Result<TimeSeries, ApiError> {
        self.calls.lock().unwrap().push(request.coin_id.clone());
        if request.coin_id == "broken" {
            return Err(ApiError::ApiError("503 Service Unavailable".to_string()));
        }
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let observations = (0..request.days)
            .map(|i| Observation::new(start + Duration::days(i as i64), 100.0 + i as f64, 10.0))
            .collect();
        Ok(TimeSeries::from_observations(observations).unwrap())
    }

    async fn fetch_coin_info(&self, coin_id: &str, vs_currency: &str) -> Result<CoinInfo, ApiError> {
        self.calls.lock().unwrap().push(format!("info:{}", coin_id));
        Ok(CoinInfo {
            id: coin_id.to_string(),
            symbol: coin_id[..3].to_string(),
            name: coin_id.to_string(),
            vs_currency: vs_currency.to_string(),
            current_price: Some(104.0),
            market_cap: Some(1.0e9),
            change_24h: Some(0.5),
            change_7d: None,
            change_30d: None,
        })
    }
}

fn request(coin: &str) -> MarketChartRequest {
    MarketChartRequest::new(coin, "usd", 5)
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let source = CachedSource::new(RecordingSource::default(), 4);
    let first = source.fetch_market_chart(&request("bitcoin")).await.unwrap();
    let second = source.fetch_market_chart(&request("bitcoin")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.inner().calls(), vec!["bitcoin"]);
    assert_eq!(source.len().await, 1);
}

#[tokio::test]
async fn different_parameters_are_different_entries() {
    let source = CachedSource::new(RecordingSource::default(), 4);
    source.fetch_market_chart(&request("bitcoin")).await.unwrap();
    source
        .fetch_market_chart(&MarketChartRequest::new("bitcoin", "usd", 30))
        .await
        .unwrap();
    assert_eq!(source.inner().calls().len(), 2);
}

#[tokio::test]
async fn least_recently_used_entry_is_evicted() {
    let source = CachedSource::new(RecordingSource::default(), 2);
    for coin in ["bitcoin", "ethereum", "bitcoin", "solana", "bitcoin", "ethereum"] {
        source.fetch_market_chart(&request(coin)).await.unwrap();
    }
    // `solana` pushed out `ethereum`, which had not been used since `bitcoin`'s hit.
    assert_eq!(
        source.inner().calls(),
        vec!["bitcoin", "ethereum", "solana", "ethereum"]
    );
    assert_eq!(source.len().await, 2);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let source = CachedSource::new(RecordingSource::default(), 4);
    assert!(source.fetch_market_chart(&request("broken")).await.is_err());
    assert!(source.fetch_market_chart(&request("broken")).await.is_err());
    assert_eq!(source.inner().calls().len(), 2);
    assert!(source.is_empty().await);
}

#[tokio::test]
async fn clear_forgets_everything() {
    let source = CachedSource::new(RecordingSource::default(), 0);
    source.fetch_market_chart(&request("bitcoin")).await.unwrap();
    source.clear().await;
    source.fetch_market_chart(&request("bitcoin")).await.unwrap();
    assert_eq!(source.inner().calls().len(), 2);
}

#[tokio::test]
async fn coin_info_is_always_fetched_live() {
    let source = CachedSource::new(RecordingSource::default(), 4);
    let first = source.fetch_coin_info("bitcoin", "usd").await.unwrap();
    source.fetch_coin_info("bitcoin", "usd").await.unwrap();

    assert_eq!(first.vs_currency, "usd");
    assert_eq!(first.market_cap, Some(1.0e9));
    assert_eq!(source.inner().calls(), vec!["info:bitcoin", "info:bitcoin"]);
    assert!(source.is_empty().await);
}
