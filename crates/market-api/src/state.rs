//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러가 `Arc<AppState>`로 공유합니다. 캐시와 in-flight
//! 레지스트리는 프로세스당 한 번 생성되어 여기에 주입됩니다.

use anyhow::Context;
use chrono::{DateTime, Utc};
use market_core::AppConfig;
use market_data::{ChartDataService, CoinGeckoClient, MarketSnapshotService, YahooEtfProvider};
use std::sync::Arc;

/// 애플리케이션 상태.
pub struct AppState {
    /// 차트 데이터 서비스
    pub chart: ChartDataService,
    /// 시세 스냅샷 서비스
    pub snapshot: Arc<MarketSnapshotService>,
    /// API 버전
    pub version: String,
    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(chart: ChartDataService, snapshot: Arc<MarketSnapshotService>) -> Self {
        Self {
            chart,
            snapshot,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// 설정으로 업스트림 클라이언트와 캐시를 구성합니다.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let coingecko = Arc::new(
            CoinGeckoClient::new(&config.upstream).context("CoinGecko 클라이언트 생성 실패")?,
        );
        let etfs = Arc::new(YahooEtfProvider::new().context("Yahoo Finance 연결 실패")?);

        let chart = ChartDataService::from_config(&config.chart, coingecko.clone(), coingecko.clone())
            .context("차트 캐시 설정 오류")?;
        let snapshot = MarketSnapshotService::new(coingecko, etfs, &config.snapshot)
            .context("스냅샷 설정 오류")?;

        Ok(Self::new(chart, Arc::new(snapshot)))
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 네트워크 없이 고정된 값을 반환하는 제공자를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use market_core::SnapshotConfig;
    use market_data::cache::RefreshPolicy;
    use market_core::TimeframeTable;

    let source = Arc::new(test_support::StaticMarket);
    let chart = ChartDataService::new(
        source.clone(),
        source.clone(),
        RefreshPolicy::default(),
        TimeframeTable::default(),
    );

    let config = SnapshotConfig {
        currencies: vec!["USD".into(), "EUR".into()],
        etfs: vec!["SPY".into()],
        ..Default::default()
    };
    let snapshot = MarketSnapshotService::new(source.clone(), source, &config)
        .expect("test snapshot config is valid");

    AppState::new(chart, Arc::new(snapshot))
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    //! 고정 응답 제공자.

    use async_trait::async_trait;
    use market_core::{ChartDays, Currency, PricePoint};
    use market_data::provider::{ChartSeriesSource, EtfQuoteSource, SpotPriceSource};
    use market_data::{DataError, Result};

    /// USD/EUR만 아는 고정 시장.
    pub struct StaticMarket;

    impl StaticMarket {
        pub fn price(currency: &Currency) -> Option<f64> {
            match currency.as_str() {
                "usd" => Some(50_000.0),
                "eur" => Some(46_000.0),
                _ => None,
            }
        }
    }

    #[async_trait]
    impl ChartSeriesSource for StaticMarket {
        async fn fetch_chart(&self, currency: &Currency, _days: ChartDays) -> Result<Vec<PricePoint>> {
            let price = Self::price(currency)
                .ok_or_else(|| DataError::Network(format!("{} 미지원", currency)))?;
            Ok(vec![
                PricePoint::new(1_700_000_000_000, price),
                PricePoint::new(1_700_003_600_000, price + 1.0),
            ])
        }
    }

    #[async_trait]
    impl SpotPriceSource for StaticMarket {
        async fn spot_price(&self, currency: &Currency) -> Result<f64> {
            Self::price(currency).ok_or_else(|| DataError::NotFound(currency.to_string()))
        }
    }

    #[async_trait]
    impl EtfQuoteSource for StaticMarket {
        async fn last_close(&self, ticker: &str) -> Result<f64> {
            match ticker {
                "SPY" => Ok(500.0),
                _ => Err(DataError::NotFound(ticker.to_string())),
            }
        }
    }
}
