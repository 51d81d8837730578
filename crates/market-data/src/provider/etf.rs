//! ETF 시세 제공자.
//!
//! 시세 스냅샷에 BTC 대비 주요 ETF 가격을 함께 보여주기 위해 사용합니다.
//! Yahoo Finance 일봉의 마지막 종가를 현재가로 취급합니다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use yahoo_finance_api as yahoo;

use crate::error::{DataError, Result};

/// ETF 한 종목의 시세.
///
/// 조회 실패 시 가격 대신 `error`가 채워집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfQuote {
    pub ticker: String,
    pub price_usd: Option<f64>,
    /// BTC 단위 가격 (`price_usd / btc_usd`)
    pub price_btc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EtfQuote {
    /// 조회 결과와 BTC/USD 가격으로 시세를 구성합니다.
    pub fn from_lookup(ticker: &str, lookup: Result<f64>, btc_usd: Option<f64>) -> Self {
        match lookup {
            Ok(price_usd) => Self {
                ticker: ticker.to_string(),
                price_usd: Some(price_usd),
                price_btc: btc_usd.filter(|b| *b > 0.0).map(|b| price_usd / b),
                error: None,
            },
            Err(e) => Self {
                ticker: ticker.to_string(),
                price_usd: None,
                price_btc: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// ETF 종가 제공자.
#[async_trait]
pub trait EtfQuoteSource: Send + Sync {
    /// 가장 최근 종가 (USD).
    async fn last_close(&self, ticker: &str) -> Result<f64>;
}

/// Yahoo Finance 기반 ETF 제공자.
pub struct YahooEtfProvider {
    connector: yahoo::YahooConnector,
}

impl YahooEtfProvider {
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::Network(format!("Yahoo Finance 연결 실패: {}", e)))?;

        Ok(Self { connector })
    }
}

#[async_trait]
impl EtfQuoteSource for YahooEtfProvider {
    async fn last_close(&self, ticker: &str) -> Result<f64> {
        // 주말과 휴장일을 고려해 5일 범위 조회
        let response = self
            .connector
            .get_quote_range(ticker, "1d", "5d")
            .await
            .map_err(|e| DataError::Network(format!("{}: {}", ticker, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::MalformedResponse(format!("{}: {}", ticker, e)))?;

        let close = quotes
            .last()
            .map(|q| q.close)
            .ok_or_else(|| DataError::NotFound(format!("{} 종가 없음", ticker)))?;

        debug!(ticker, close, "ETF 종가 수신");
        Ok(close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_in_btc() {
        let quote = EtfQuote::from_lookup("SPY", Ok(500.0), Some(50_000.0));
        assert_eq!(quote.price_usd, Some(500.0));
        assert_eq!(quote.price_btc, Some(0.01));
        assert!(quote.error.is_none());
    }

    #[test]
    fn test_quote_without_btc_price() {
        let quote = EtfQuote::from_lookup("VOO", Ok(450.0), None);
        assert_eq!(quote.price_usd, Some(450.0));
        assert_eq!(quote.price_btc, None);

        let quote = EtfQuote::from_lookup("VOO", Ok(450.0), Some(0.0));
        assert_eq!(quote.price_btc, None);
    }

    #[test]
    fn test_failed_lookup_records_error() {
        let quote = EtfQuote::from_lookup("QQQ", Err(DataError::NotFound("QQQ".into())), Some(1.0));
        assert_eq!(quote.price_usd, None);
        assert!(quote.error.unwrap().contains("QQQ"));
    }
}
