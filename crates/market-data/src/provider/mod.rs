//! 업스트림 데이터 제공자.
//!
//! 캐시 계층은 아래 트레잇에만 의존하므로 어떤 시계열 제공자로도
//! 교체할 수 있습니다.

pub mod coingecko;
pub mod etf;

pub use coingecko::CoinGeckoClient;
pub use etf::{EtfQuote, EtfQuoteSource, YahooEtfProvider};

use async_trait::async_trait;
use market_core::{ChartDays, Currency, PricePoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// 통화별 현재가와 시가총액.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyQuote {
    pub price: f64,
    pub market_cap: Option<f64>,
}

/// 가격 시계열 제공자.
///
/// 한 번의 업스트림 요청을 수행하며 재시도하지 않습니다.
#[async_trait]
pub trait ChartSeriesSource: Send + Sync {
    /// `currency` 기준 최근 `days` 기간의 가격 시계열 조회.
    async fn fetch_chart(&self, currency: &Currency, days: ChartDays) -> Result<Vec<PricePoint>>;
}

/// 현재가 제공자.
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    /// `currency` 기준 현재가 조회.
    async fn spot_price(&self, currency: &Currency) -> Result<f64>;

    /// 여러 통화의 현재가를 한 번에 조회합니다.
    ///
    /// 기본 구현은 통화마다 [`spot_price`](Self::spot_price)를 호출하고
    /// 시가총액은 비워 둡니다. 실패한 통화는 결과에서 빠집니다.
    async fn spot_quotes(&self, currencies: &[Currency]) -> Result<HashMap<Currency, CurrencyQuote>> {
        let mut quotes = HashMap::with_capacity(currencies.len());
        for currency in currencies {
            if let Ok(price) = self.spot_price(currency).await {
                quotes.insert(
                    currency.clone(),
                    CurrencyQuote {
                        price,
                        market_cap: None,
                    },
                );
            }
        }
        Ok(quotes)
    }
}
