//! 호가 통화 정의.
//!
//! 업스트림에 전달되는 통화 코드는 항상 소문자로 정규화됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;

/// 스냅샷에서 조회하는 기본 통화 목록.
pub const DEFAULT_CURRENCIES: &[&str] = &[
    "AUD", "BRL", "CAD", "CHF", "CNY", "CZK", "EUR", "GBP", "HKD", "ILS", "JPY", "KRW", "NOK",
    "NZD", "PLN", "RUB", "SEK", "SGD", "USD", "BTC",
];

/// 검증된 호가 통화 코드 (예: usd, eur, btc).
///
/// 생성 시 공백 제거 후 소문자로 정규화되므로 `"USD"`와 `"usd"`는
/// 같은 값입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// 통화 코드를 검증하고 정규화합니다.
    pub fn new(code: &str) -> Result<Self, MarketError> {
        let normalized = code.trim().to_lowercase();
        let valid_len = (2..=5).contains(&normalized.len());

        if !valid_len || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MarketError::InvalidInput(format!(
                "지원하지 않는 통화 코드: '{}'",
                code
            )));
        }

        Ok(Self(normalized))
    }

    /// 업스트림 쿼리에 사용하는 소문자 코드.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 표시용 대문자 코드.
    pub fn to_upper(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = MarketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}
