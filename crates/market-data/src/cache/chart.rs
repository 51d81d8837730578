//! 차트 데이터 서비스 (stale-while-revalidate).
//!
//! 키별 동작:
//! - 캐시 항목이 있으면 나이와 관계없이 즉시 반환합니다.
//!   `refresh_after`보다 오래됐으면 백그라운드 갱신을 한 번만 시작합니다.
//! - 항목이 없으면 호출자가 업스트림 조회를 기다립니다.
//!   실패하면 [`FallbackChain`]의 결과를 반환합니다.
//!
//! 같은 키에 대한 백그라운드 갱신은 [`InFlightRegistry`]로 하나만 실행됩니다.
//! 동기 조회는 키별 공유 future로 묶여, 동시에 들어온 첫 요청들이
//! 업스트림 호출 한 번의 결과(대체 응답 포함)를 함께 받습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! let service = ChartDataService::from_config(&config.chart, client.clone(), client)?;
//! let series = service.get_chart_data("usd", "7d").await;
//! ```

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use market_core::{ChartCacheConfig, ChartDays, ChartKey, MarketResult, PriceSeries, TimeframeTable};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::provider::{ChartSeriesSource, SpotPriceSource};

use super::fallback::FallbackChain;
use super::inflight::{InFlightGuard, InFlightRegistry};
use super::store::ChartCacheStore;

/// 진행 중인 동기 조회. 모든 대기자가 같은 결과를 받습니다.
type PendingFetch = Shared<BoxFuture<'static, PriceSeries>>;

/// 갱신 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// 이 시간보다 오래된 항목은 다음 조회 시 백그라운드 갱신
    pub refresh_after: Duration,
    /// 권장 최대 보관 시간
    pub ttl: Duration,
    /// `ttl`이 지난 항목을 없는 것으로 취급할지 여부
    pub enforce_ttl: bool,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            refresh_after: Duration::from_secs(15 * 60),
            ttl: Duration::from_secs(60 * 60),
            enforce_ttl: false,
        }
    }
}

impl RefreshPolicy {
    pub fn from_config(config: &ChartCacheConfig) -> Self {
        Self {
            refresh_after: config.refresh_after(),
            ttl: config.ttl(),
            enforce_ttl: config.enforce_ttl,
        }
    }

    fn is_stale(&self, age: chrono::Duration) -> bool {
        exceeds(age, self.refresh_after)
    }

    fn is_expired(&self, age: chrono::Duration) -> bool {
        self.enforce_ttl && exceeds(age, self.ttl)
    }
}

fn exceeds(age: chrono::Duration, limit: Duration) -> bool {
    // 음수 나이는 to_std가 실패하므로 신선한 것으로 취급
    age.to_std().map(|age| age > limit).unwrap_or(false)
}

// ==================== 통계 ====================

#[derive(Debug, Default)]
struct Counters {
    fresh_hits: AtomicU64,
    stale_hits: AtomicU64,
    misses: AtomicU64,
    refreshes_started: AtomicU64,
    refreshes_failed: AtomicU64,
    fallbacks_served: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 캐시 통계 스냅샷.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    pub fresh_hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub refreshes_started: u64,
    pub refreshes_failed: u64,
    pub fallbacks_served: u64,
}

// ==================== 서비스 ====================

struct Inner {
    store: ChartCacheStore,
    in_flight: InFlightRegistry,
    fetcher: Arc<dyn ChartSeriesSource>,
    fallback: FallbackChain,
    policy: RefreshPolicy,
    table: TimeframeTable,
    pending: Mutex<HashMap<ChartKey, PendingFetch>>,
    counters: Counters,
}

/// 차트 데이터 서비스. 복제 비용이 낮으며 복제본은 상태를 공유합니다.
#[derive(Clone)]
pub struct ChartDataService {
    inner: Arc<Inner>,
}

impl ChartDataService {
    pub fn new(
        fetcher: Arc<dyn ChartSeriesSource>,
        spot: Arc<dyn SpotPriceSource>,
        policy: RefreshPolicy,
        table: TimeframeTable,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: ChartCacheStore::new(),
                in_flight: InFlightRegistry::new(),
                fetcher,
                fallback: FallbackChain::new(spot),
                policy,
                table,
                pending: Mutex::new(HashMap::new()),
                counters: Counters::default(),
            }),
        }
    }

    /// 설정에서 정책과 기간 테이블을 읽어 생성합니다.
    pub fn from_config(
        config: &ChartCacheConfig,
        fetcher: Arc<dyn ChartSeriesSource>,
        spot: Arc<dyn SpotPriceSource>,
    ) -> MarketResult<Self> {
        Ok(Self::new(
            fetcher,
            spot,
            RefreshPolicy::from_config(config),
            config.timeframe_table()?,
        ))
    }

    pub fn store(&self) -> &ChartCacheStore {
        &self.inner.store
    }

    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.inner.in_flight
    }

    /// 외부 요청 진입점. 실패하지 않습니다.
    ///
    /// 통화 코드가 잘못되었으면 빈 시계열을 반환합니다.
    /// 알 수 없는 기간 토큰은 기본 기간(1m)으로 처리됩니다.
    pub async fn get_chart_data(&self, currency: &str, timeframe: &str) -> PriceSeries {
        match ChartKey::parse(currency, timeframe) {
            Ok(key) => self.request(&key).await,
            Err(e) => {
                warn!(currency, timeframe, error = %e, "잘못된 차트 요청");
                Arc::new(Vec::new())
            }
        }
    }

    /// 키에 대한 시계열을 반환합니다.
    pub async fn request(&self, key: &ChartKey) -> PriceSeries {
        let now = Utc::now();

        if let Some(entry) = self.inner.store.get(key).await {
            let age = entry.age(now);

            if self.inner.policy.is_expired(age) {
                debug!(key = %key, age_secs = age.num_seconds(), "TTL 만료, 동기 조회");
                Counters::bump(&self.inner.counters.misses);
                return self.fetch_blocking(key).await;
            }

            if self.inner.policy.is_stale(age) {
                Counters::bump(&self.inner.counters.stale_hits);
                // 이미 갱신 중이면 None, 결과는 기다리지 않음
                let _ = self.refresh(key);
            } else {
                Counters::bump(&self.inner.counters.fresh_hits);
            }

            return entry.series.clone();
        }

        Counters::bump(&self.inner.counters.misses);
        self.fetch_blocking(key).await
    }

    /// 백그라운드 갱신을 시작합니다.
    ///
    /// 같은 키가 이미 갱신 중이면 아무것도 하지 않고 `None`을 반환합니다.
    /// 반환된 핸들을 기다릴 필요는 없습니다.
    pub fn refresh(&self, key: &ChartKey) -> Option<JoinHandle<()>> {
        let Some(guard) = self.inner.in_flight.try_acquire(key) else {
            debug!(key = %key, "이미 갱신 중");
            return None;
        };

        Counters::bump(&self.inner.counters.refreshes_started);
        debug!(key = %key, "백그라운드 갱신 시작");

        let service = self.clone();
        Some(tokio::spawn(async move {
            service.run_refresh(guard).await;
        }))
    }

    /// guard는 이 함수가 끝날 때(패닉 포함) 해제됩니다.
    async fn run_refresh(&self, guard: InFlightGuard) {
        let key = guard.key();
        let days = self.resolve_days(key);

        match self.inner.fetcher.fetch_chart(&key.currency, days).await {
            Ok(points) => {
                let count = points.len();
                self.inner
                    .store
                    .put(key.clone(), Arc::new(points), Utc::now())
                    .await;
                info!(key = %key, points = count, "차트 캐시 갱신 완료");
            }
            Err(e) => {
                Counters::bump(&self.inner.counters.refreshes_failed);
                warn!(key = %key, error = %e, "백그라운드 갱신 실패, 기존 데이터 유지");
            }
        }
    }

    /// 업스트림을 직접 조회합니다. 실패 시 대체 응답을 반환합니다.
    ///
    /// 같은 키의 조회가 이미 진행 중이면 새로 호출하지 않고 그 결과를 기다립니다.
    async fn fetch_blocking(&self, key: &ChartKey) -> PriceSeries {
        let fetch = {
            let mut pending = self.inner.pending.lock().await;
            match pending.get(key) {
                Some(fetch) => {
                    debug!(key = %key, "진행 중인 조회 결과 대기");
                    fetch.clone()
                }
                None => {
                    let fetch = self.spawn_fetch(key);
                    pending.insert(key.clone(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// 조회 태스크를 띄우고 결과를 공유 future로 감쌉니다.
    ///
    /// 호출자가 모두 취소되어도 태스크는 끝까지 실행되어 캐시를 채웁니다.
    fn spawn_fetch(&self, key: &ChartKey) -> PendingFetch {
        let task = {
            let service = self.clone();
            let key = key.clone();
            tokio::spawn(async move { service.fetch_or_fallback(&key).await })
        };

        let service = self.clone();
        let key = key.clone();
        async move {
            let series = task.await.unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "차트 조회 태스크 비정상 종료");
                Arc::new(Vec::new())
            });
            service.inner.pending.lock().await.remove(&key);
            series
        }
        .boxed()
        .shared()
    }

    async fn fetch_or_fallback(&self, key: &ChartKey) -> PriceSeries {
        // 대기 맵에 등록되기 전에 다른 조회가 채웠을 수 있음
        if let Some(entry) = self.inner.store.get(key).await {
            let age = entry.age(Utc::now());
            if !self.inner.policy.is_expired(age) {
                return entry.series.clone();
            }
        }

        let days = self.resolve_days(key);
        match self.inner.fetcher.fetch_chart(&key.currency, days).await {
            Ok(points) => {
                let series: PriceSeries = Arc::new(points);
                self.inner
                    .store
                    .put(key.clone(), series.clone(), Utc::now())
                    .await;
                debug!(key = %key, days = %days, points = series.len(), "차트 데이터 조회 완료");
                series
            }
            Err(e) => {
                warn!(key = %key, days = %days, error = %e, "차트 데이터 조회 실패");
                Counters::bump(&self.inner.counters.fallbacks_served);

                let stale = self.inner.store.get(key).await;
                let (series, source) = self.inner.fallback.resolve(key, stale, Utc::now()).await;
                info!(key = %key, source = %source, points = series.len(), "대체 응답 반환");
                series
            }
        }
    }

    fn resolve_days(&self, key: &ChartKey) -> ChartDays {
        self.inner
            .table
            .resolve(key.timeframe, Utc::now().date_naive())
    }

    /// 현재 통계.
    pub async fn stats(&self) -> CacheStats {
        let c = &self.inner.counters;
        CacheStats {
            entries: self.inner.store.len().await,
            in_flight: self.inner.in_flight.len(),
            fresh_hits: c.fresh_hits.load(Ordering::Relaxed),
            stale_hits: c.stale_hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            refreshes_started: c.refreshes_started.load(Ordering::Relaxed),
            refreshes_failed: c.refreshes_failed.load(Ordering::Relaxed),
            fallbacks_served: c.fallbacks_served.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_thresholds() {
        let policy = RefreshPolicy::default();
        assert!(!policy.is_stale(chrono::Duration::minutes(15)));
        assert!(policy.is_stale(chrono::Duration::minutes(20)));
        assert!(!policy.is_stale(chrono::Duration::seconds(-5)));

        // 기본값은 TTL을 강제하지 않음
        assert!(!policy.is_expired(chrono::Duration::days(30)));

        let strict = RefreshPolicy {
            enforce_ttl: true,
            ..policy
        };
        assert!(!strict.is_expired(chrono::Duration::minutes(59)));
        assert!(strict.is_expired(chrono::Duration::minutes(61)));
    }

    #[test]
    fn test_policy_from_config() {
        let config = ChartCacheConfig {
            refresh_after_secs: 60,
            ttl_secs: 120,
            enforce_ttl: true,
            ..Default::default()
        };
        let policy = RefreshPolicy::from_config(&config);
        assert_eq!(policy.refresh_after, Duration::from_secs(60));
        assert_eq!(policy.ttl, Duration::from_secs(120));
        assert!(policy.enforce_ttl);
    }
}
