//! CoinGecko REST API 클라이언트.
//!
//! 두 엔드포인트만 사용합니다:
//! - `/coins/{id}/market_chart`: 가격 시계열 ([`ChartSeriesSource`])
//! - `/simple/price`: 통화별 현재가와 시가총액 ([`SpotPriceSource`])
//!
//! 모든 요청은 설정된 타임아웃으로 제한되며 재시도하지 않습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use market_core::{ChartDays, Currency, UpstreamConfig};
//! use market_data::provider::{ChartSeriesSource, CoinGeckoClient};
//!
//! let client = CoinGeckoClient::new(&UpstreamConfig::default())?;
//! let usd = Currency::new("usd")?;
//! let series = client.fetch_chart(&usd, ChartDays::Days(7)).await?;
//! ```

use async_trait::async_trait;
use market_core::{ChartDays, Currency, PricePoint, UpstreamConfig};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::{ChartSeriesSource, CurrencyQuote, SpotPriceSource};
use crate::error::{DataError, Result};

/// 데모 API 키 헤더.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko API 클라이언트.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    coin_id: String,
    api_key: Option<String>,
}

/// `/coins/{id}/market_chart` 응답.
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// [timestamp_ms, price] 쌍 목록
    prices: Vec<(f64, f64)>,
}

impl CoinGeckoClient {
    /// 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(concat!("market-data/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            coin_id: config.coin_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// 공통 GET 요청 (상태 코드 확인 포함).
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Network(format!(
                "CoinGecko {} 응답: HTTP {}",
                path, status
            )));
        }

        Ok(response.text().await?)
    }

    /// 가격 시계열 조회.
    #[instrument(skip(self), fields(coin = %self.coin_id))]
    pub async fn market_chart(
        &self,
        currency: &Currency,
        days: ChartDays,
    ) -> Result<Vec<PricePoint>> {
        let path = format!("/coins/{}/market_chart", self.coin_id);
        let body = self
            .get_json(
                &path,
                &[
                    ("vs_currency", currency.as_str().to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        let parsed: MarketChartResponse = serde_json::from_str(&body)?;
        let points: Vec<PricePoint> = parsed
            .prices
            .into_iter()
            .map(|(ts, price)| PricePoint::new(ts as i64, price))
            .collect();

        debug!(points = points.len(), "market_chart 수신");
        Ok(points)
    }

    /// 여러 통화의 현재가와 시가총액 조회.
    ///
    /// 응답에 없는 통화는 결과 맵에서 빠집니다.
    #[instrument(skip(self, currencies), fields(coin = %self.coin_id, count = currencies.len()))]
    pub async fn simple_price(
        &self,
        currencies: &[Currency],
    ) -> Result<HashMap<Currency, CurrencyQuote>> {
        let vs_currencies = currencies
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let body = self
            .get_json(
                "/simple/price",
                &[
                    ("ids", self.coin_id.clone()),
                    ("vs_currencies", vs_currencies),
                    ("include_market_cap", "true".to_string()),
                ],
            )
            .await?;

        let parsed: HashMap<String, HashMap<String, Option<f64>>> = serde_json::from_str(&body)?;
        let Some(fields) = parsed.get(&self.coin_id) else {
            return Err(DataError::MalformedResponse(format!(
                "simple/price 응답에 '{}' 항목 없음",
                self.coin_id
            )));
        };

        let quotes: HashMap<Currency, CurrencyQuote> = currencies
            .iter()
            .filter_map(|currency| {
                let price = fields.get(currency.as_str()).copied().flatten()?;
                let market_cap = fields
                    .get(&format!("{}_market_cap", currency.as_str()))
                    .copied()
                    .flatten();
                Some((currency.clone(), CurrencyQuote { price, market_cap }))
            })
            .collect();

        debug!(quotes = quotes.len(), "simple/price 수신");
        Ok(quotes)
    }
}

#[async_trait]
impl ChartSeriesSource for CoinGeckoClient {
    async fn fetch_chart(&self, currency: &Currency, days: ChartDays) -> Result<Vec<PricePoint>> {
        self.market_chart(currency, days).await
    }
}

#[async_trait]
impl SpotPriceSource for CoinGeckoClient {
    async fn spot_price(&self, currency: &Currency) -> Result<f64> {
        let quotes = self.simple_price(std::slice::from_ref(currency)).await?;
        quotes
            .get(currency)
            .map(|q| q.price)
            .ok_or_else(|| DataError::NotFound(format!("{} 현재가 없음", currency)))
    }

    async fn spot_quotes(&self, currencies: &[Currency]) -> Result<HashMap<Currency, CurrencyQuote>> {
        self.simple_price(currencies).await
    }
}
