//! 차트 캐시 저장소.
//!
//! 키별 항목은 통째로 교체되며 제자리에서 수정되지 않습니다.
//! 조회자는 `Arc<CacheEntry>`를 받으므로 갱신과 동시에 읽어도
//! 반쯤 쓰인 시계열을 볼 수 없습니다.

use chrono::{DateTime, Duration, Utc};
use market_core::{ChartKey, PriceSeries};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 저장된 시계열과 저장 시각.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub series: PriceSeries,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// `now` 기준 경과 시간. 시계가 뒤로 간 경우 0으로 취급합니다.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).max(Duration::zero())
    }
}

/// 메모리 기반 차트 캐시. 제거 정책 없음.
#[derive(Debug, Default)]
pub struct ChartCacheStore {
    entries: RwLock<HashMap<ChartKey, Arc<CacheEntry>>>,
}

impl ChartCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &ChartKey) -> Option<Arc<CacheEntry>> {
        self.entries.read().await.get(key).cloned()
    }

    /// 항목을 교체하고 저장된 항목을 반환합니다.
    pub async fn put(
        &self,
        key: ChartKey,
        series: PriceSeries,
        now: DateTime<Utc>,
    ) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            series,
            stored_at: now,
        });
        self.entries.write().await.insert(key, entry.clone());
        entry
    }

    /// 항목이 없으면 `None`.
    pub async fn age(&self, key: &ChartKey, now: DateTime<Utc>) -> Option<Duration> {
        self.get(key).await.map(|entry| entry.age(now))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{Currency, PricePoint, Timeframe};

    fn key(currency: &str) -> ChartKey {
        ChartKey::new(Currency::new(currency).unwrap(), Timeframe::D7)
    }

    fn series(prices: &[f64]) -> PriceSeries {
        Arc::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| PricePoint::new(i as i64 * 1000, *p))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = ChartCacheStore::new();
        assert!(store.get(&key("usd")).await.is_none());
        assert!(store.age(&key("usd"), Utc::now()).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_entry() {
        let store = ChartCacheStore::new();
        let t0 = Utc::now();

        store.put(key("usd"), series(&[1.0, 2.0]), t0).await;
        let before = store.get(&key("usd")).await.unwrap();

        let t1 = t0 + Duration::minutes(5);
        store.put(key("usd"), series(&[3.0]), t1).await;
        let after = store.get(&key("usd")).await.unwrap();

        // 이전에 받은 스냅샷은 그대로
        assert_eq!(before.series.len(), 2);
        assert_eq!(before.stored_at, t0);
        assert_eq!(after.series.len(), 1);
        assert_eq!(after.stored_at, t1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_age() {
        let store = ChartCacheStore::new();
        let t0 = Utc::now();
        store.put(key("eur"), series(&[1.0]), t0).await;

        let age = store.age(&key("eur"), t0 + Duration::minutes(20)).await;
        assert_eq!(age, Some(Duration::minutes(20)));

        // 저장 시각보다 이른 now
        let age = store.age(&key("eur"), t0 - Duration::seconds(1)).await;
        assert_eq!(age, Some(Duration::zero()));
    }
}
