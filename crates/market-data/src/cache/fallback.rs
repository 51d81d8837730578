//! 동기 조회 실패 시 사용하는 대체 응답 체인.
//!
//! 순서:
//! 1. 오래된 캐시 항목 (얼마나 오래됐든)
//! 2. 현재가로 만든 2점 시계열
//! 3. 빈 시계열

use chrono::{DateTime, Utc};
use market_core::{ChartKey, PricePoint, PriceSeries};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::provider::SpotPriceSource;

use super::store::CacheEntry;

/// 현재가 시계열의 시작점 간격 (1시간).
pub const SPOT_SERIES_SPAN_MS: i64 = 60 * 60 * 1000;

/// 대체 응답의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackSource {
    StaleCache,
    SpotPrice,
    Empty,
}

impl fmt::Display for FallbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FallbackSource::StaleCache => "stale_cache",
            FallbackSource::SpotPrice => "spot_price",
            FallbackSource::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

/// 현재가 하나로 `[(now - 1h, price), (now, price)]` 시계열을 만듭니다.
pub fn synthesize_spot_series(price: f64, now: DateTime<Utc>) -> Vec<PricePoint> {
    let now_ms = now.timestamp_millis();
    vec![
        PricePoint::new(now_ms - SPOT_SERIES_SPAN_MS, price),
        PricePoint::new(now_ms, price),
    ]
}

/// 대체 응답 체인.
pub struct FallbackChain {
    spot: Arc<dyn SpotPriceSource>,
}

impl FallbackChain {
    pub fn new(spot: Arc<dyn SpotPriceSource>) -> Self {
        Self { spot }
    }

    /// 사용할 수 있는 첫 번째 대체 응답을 반환합니다. 실패하지 않습니다.
    pub async fn resolve(
        &self,
        key: &ChartKey,
        stale: Option<Arc<CacheEntry>>,
        now: DateTime<Utc>,
    ) -> (PriceSeries, FallbackSource) {
        if let Some(entry) = stale {
            return (entry.series.clone(), FallbackSource::StaleCache);
        }

        match self.spot.spot_price(&key.currency).await {
            Ok(price) => (
                Arc::new(synthesize_spot_series(price, now)),
                FallbackSource::SpotPrice,
            ),
            Err(e) => {
                debug!(key = %key, error = %e, "현재가 조회 실패, 빈 시계열 반환");
                (Arc::new(Vec::new()), FallbackSource::Empty)
            }
        }
    }
}
