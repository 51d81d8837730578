//! 고정 TTL 시세 스냅샷.
//!
//! 전체 통화 현재가와 ETF 시세를 묶어 `ttl` 동안 재사용합니다.
//! 다시 가져오다 실패하면 마지막으로 성공한 값을 계속 반환합니다.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use market_core::{Currency, MarketResult, SnapshotConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::{CurrencyQuote, EtfQuote, EtfQuoteSource, SpotPriceSource};

/// 단일 값 TTL 캐시.
pub struct TtlCache<V> {
    ttl: Duration,
    slot: RwLock<Option<(V, Instant)>>,
    refill: Mutex<()>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
            refill: Mutex::new(()),
        }
    }

    /// TTL 이내의 값.
    pub async fn get(&self) -> Option<V> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some((value, stored_at)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// TTL 이내 값이 있으면 반환하고, 없으면 `fetch`로 채웁니다.
    ///
    /// `fetch`가 실패하면 만료된 값이라도 있으면 반환합니다.
    pub async fn get_or_refresh<F, Fut, E>(&self, fetch: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: Display,
    {
        if let Some(value) = self.get().await {
            return Ok(value);
        }

        let _refill = self.refill.lock().await;
        if let Some(value) = self.get().await {
            return Ok(value);
        }

        match fetch().await {
            Ok(value) => {
                *self.slot.write().await = Some((value.clone(), Instant::now()));
                Ok(value)
            }
            Err(e) => {
                let slot = self.slot.read().await;
                match slot.as_ref() {
                    Some((value, _)) => {
                        warn!(error = %e, "스냅샷 갱신 실패, 이전 값 사용");
                        Ok(value.clone())
                    }
                    None => Err(e),
                }
            }
        }
    }
}

/// 시세 스냅샷.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    /// 대문자 통화 코드별 시세 (응답에 없는 통화는 제외)
    pub currencies: BTreeMap<String, CurrencyQuote>,
    /// USD 가격 × 1e8 (정수 절사)
    pub sat: Option<u64>,
    #[serde(rename = "ETFs")]
    pub etfs: BTreeMap<String, EtfQuote>,
}

/// 시세 스냅샷 서비스.
pub struct MarketSnapshotService {
    quotes: Arc<dyn SpotPriceSource>,
    etfs: Arc<dyn EtfQuoteSource>,
    currencies: Vec<Currency>,
    tickers: Vec<String>,
    cache: TtlCache<Arc<MarketSnapshot>>,
}

impl MarketSnapshotService {
    pub fn new(
        quotes: Arc<dyn SpotPriceSource>,
        etfs: Arc<dyn EtfQuoteSource>,
        config: &SnapshotConfig,
    ) -> MarketResult<Self> {
        let currencies = config
            .currencies
            .iter()
            .map(|c| Currency::new(c))
            .collect::<MarketResult<Vec<_>>>()?;

        Ok(Self {
            quotes,
            etfs,
            currencies,
            tickers: config.etfs.clone(),
            cache: TtlCache::new(config.ttl()),
        })
    }

    /// 캐시된 스냅샷 또는 새로 만든 스냅샷.
    pub async fn snapshot(&self) -> Result<Arc<MarketSnapshot>> {
        self.cache.get_or_refresh(|| self.build()).await
    }

    async fn build(&self) -> Result<Arc<MarketSnapshot>> {
        let quotes = self.quotes.spot_quotes(&self.currencies).await?;
        let btc_usd = quotes.iter().find(|(c, _)| c.as_str() == "usd").map(|(_, q)| q.price);

        let lookups = join_all(self.tickers.iter().map(|t| self.etfs.last_close(t))).await;
        let etfs = self
            .tickers
            .iter()
            .zip(lookups)
            .map(|(ticker, lookup)| (ticker.clone(), EtfQuote::from_lookup(ticker, lookup, btc_usd)))
            .collect();

        let currencies: BTreeMap<String, CurrencyQuote> = quotes
            .into_iter()
            .map(|(currency, quote)| (currency.to_upper(), quote))
            .collect();

        debug!(currencies = currencies.len(), "시세 스냅샷 생성");

        Ok(Arc::new(MarketSnapshot {
            timestamp: Utc::now(),
            currencies,
            sat: btc_usd.map(|usd| (usd * 100_000_000.0) as u64),
            etfs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_ttl_cache_reuses_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let v: std::result::Result<u32, DataError> = cache
                .get_or_refresh(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(v.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get().await.is_none());

        let v: std::result::Result<u32, DataError> = cache.get_or_refresh(|| async { Ok(8) }).await;
        assert_eq!(v.unwrap(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_cache_serves_last_value_on_error() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let _ = cache
            .get_or_refresh(|| async { Ok::<_, DataError>(1u32) })
            .await;

        tokio::time::advance(Duration::from_secs(120)).await;
        let v = cache
            .get_or_refresh(|| async { Err::<u32, _>(DataError::Network("down".into())) })
            .await;
        assert_eq!(v.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ttl_cache_error_without_value() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let v = cache
            .get_or_refresh(|| async { Err::<u32, _>(DataError::Network("down".into())) })
            .await;
        assert!(v.is_err());
    }

    struct FixedQuotes;

    #[async_trait]
    impl SpotPriceSource for FixedQuotes {
        async fn spot_price(&self, currency: &Currency) -> Result<f64> {
            match currency.as_str() {
                "usd" => Ok(50_000.0),
                "eur" => Ok(46_000.0),
                other => Err(DataError::NotFound(other.to_string())),
            }
        }
    }

    struct FixedEtfs;

    #[async_trait]
    impl EtfQuoteSource for FixedEtfs {
        async fn last_close(&self, ticker: &str) -> Result<f64> {
            match ticker {
                "SPY" => Ok(500.0),
                _ => Err(DataError::NotFound(ticker.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_contents() {
        let config = SnapshotConfig {
            currencies: vec!["USD".into(), "EUR".into(), "JPY".into()],
            etfs: vec!["SPY".into(), "QQQ".into()],
            ..Default::default()
        };
        let service =
            MarketSnapshotService::new(Arc::new(FixedQuotes), Arc::new(FixedEtfs), &config).unwrap();

        let snapshot = service.snapshot().await.unwrap();
        assert_eq!(snapshot.currencies.len(), 2);
        assert_eq!(snapshot.currencies["USD"].price, 50_000.0);
        assert!(!snapshot.currencies.contains_key("JPY"));
        assert_eq!(snapshot.sat, Some(5_000_000_000_000));
        assert_eq!(snapshot.etfs["SPY"].price_btc, Some(0.01));
        assert!(snapshot.etfs["QQQ"].error.is_some());

        // 두 번째 호출은 캐시된 동일 스냅샷
        let again = service.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&snapshot, &again));
    }

    #[test]
    fn test_invalid_configured_currency() {
        let config = SnapshotConfig {
            currencies: vec!["not a code".into()],
            ..Default::default()
        };
        assert!(
            MarketSnapshotService::new(Arc::new(FixedQuotes), Arc::new(FixedEtfs), &config).is_err()
        );
    }
}
