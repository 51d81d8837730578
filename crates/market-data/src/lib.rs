//! # Market Data
//!
//! 업스트림 시세 제공자와 캐싱 레이어.
//!
//! 주요 구성:
//! - [`provider`]: CoinGecko 시계열/현재가, Yahoo Finance ETF 종가
//! - [`cache`]: 차트 데이터 서비스와 시세 스냅샷

pub mod cache;
pub mod error;
pub mod provider;

pub use cache::{CacheStats, ChartDataService, MarketSnapshot, MarketSnapshotService, RefreshPolicy};
pub use error::{DataError, Result};
pub use provider::{
    ChartSeriesSource, CoinGeckoClient, CurrencyQuote, EtfQuote, EtfQuoteSource, SpotPriceSource,
    YahooEtfProvider,
};
