//! 가격 시계열 타입.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 시계열의 한 지점 (epoch 밀리초, 가격).
///
/// JSON에서는 프론트엔드 차트가 기대하는 `[timestamp_ms, price]` 쌍으로
/// 직렬화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct PricePoint {
    /// epoch 기준 밀리초
    pub timestamp_ms: i64,
    /// 가격
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }
}

impl From<(i64, f64)> for PricePoint {
    fn from((timestamp_ms, price): (i64, f64)) -> Self {
        Self::new(timestamp_ms, price)
    }
}

impl From<PricePoint> for (i64, f64) {
    fn from(point: PricePoint) -> Self {
        (point.timestamp_ms, point.price)
    }
}

/// 호출자에게 전달되는 읽기 전용 시계열.
///
/// 갱신은 항상 새 시계열로 교체되므로 공유 중인 값이 변경되는 일은 없습니다.
pub type PriceSeries = Arc<Vec<PricePoint>>;
