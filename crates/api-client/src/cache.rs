use crate::error::ApiError;
use crate::{MarketChartRequest, MarketDataSource};
use async_trait::async_trait;
use core_types::{CoinInfo, TimeSeries};
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

/// Wraps a source with a bounded least-recently-used cache of fetched series.
///
/// Failed fetches are not cached. Coin info is a live snapshot and always
/// goes to the inner source. The lock is not held while the inner source
/// is queried, so two concurrent misses for the same request both go out.
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<LruCache<MarketChartRequest, TimeSeries>>,
}

impl<S: MarketDataSource> CachedSource<S> {
    /// A zero `capacity` is treated as one.
    pub fn new(inner: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached series.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }
}

#[async_trait]
impl<S: MarketDataSource> MarketDataSource for CachedSource<S> {
    async fn fetch_market_chart(
        &self,
        request: &MarketChartRequest,
    ) -> Result<TimeSeries, ApiError> {
        let cached = self.cache.lock().await.get(request).cloned();
        if let Some(series) = cached {
            tracing::debug!(coin = %request.coin_id, days = request.days, "market chart cache hit");
            return Ok(series);
        }

        let series = self
            .inner
            .fetch_market_chart(request)
            .await
            .inspect_err(|e| {
                tracing::warn!(coin = %request.coin_id, error = %e, "market chart fetch failed, not cached");
            })?;

        self.cache.lock().await.put(request.clone(), series.clone());
        Ok(series)
    }

    async fn fetch_coin_info(&self, coin_id: &str, vs_currency: &str) -> Result<CoinInfo, ApiError> {
        self.inner.fetch_coin_info(coin_id, vs_currency).await
    }
}
