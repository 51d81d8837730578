//! 캐싱 레이어.
//!
//! - Chart 캐시: 통화×기간별 가격 시계열 (stale-while-revalidate, single-flight)
//! - Snapshot 캐시: 전체 통화 현재가와 ETF 시세 (고정 TTL)

pub mod chart;
pub mod fallback;
pub mod inflight;
pub mod snapshot;
pub mod store;

pub use chart::{CacheStats, ChartDataService, RefreshPolicy};
pub use fallback::{synthesize_spot_series, FallbackChain, FallbackSource};
pub use inflight::{InFlightGuard, InFlightRegistry};
pub use snapshot::{MarketSnapshot, MarketSnapshotService, TtlCache};
pub use store::{CacheEntry, ChartCacheStore};
