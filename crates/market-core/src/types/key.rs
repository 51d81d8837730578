//! 차트 캐시 키.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Currency, Timeframe};
use crate::error::MarketError;

/// (통화, 기간) 복합 키.
///
/// 생성 후 변경되지 않으며 캐시와 진행 중 갱신 목록 모두에서 키로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartKey {
    /// 호가 통화
    pub currency: Currency,
    /// 조회 기간
    pub timeframe: Timeframe,
}

impl ChartKey {
    /// 새 키를 생성합니다.
    pub fn new(currency: Currency, timeframe: Timeframe) -> Self {
        Self {
            currency,
            timeframe,
        }
    }

    /// 요청 문자열에서 키를 생성합니다.
    ///
    /// 통화 코드는 검증하고, 기간 토큰은 관대하게 해석합니다
    /// ([`Timeframe::parse_lenient`]).
    pub fn parse(currency: &str, timeframe: &str) -> Result<Self, MarketError> {
        Ok(Self::new(
            Currency::new(currency)?,
            Timeframe::parse_lenient(timeframe),
        ))
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.currency, self.timeframe)
    }
}
