//! 차트 데이터 endpoint.
//!
//! `GET /api/chart-data?currency=usd&timeframe=7d`
//!
//! `[[timestamp_ms, price], ...]` 배열을 반환합니다. 업스트림 장애는
//! 캐시된 데이터나 대체 응답으로 흡수되므로 5xx를 반환하지 않습니다.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use market_core::{Currency, PriceSeries};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 쿼리 파라미터. 생략 시 `usd`, `1m`.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_timeframe() -> String {
    "1m".to_string()
}

/// 차트 데이터 조회.
///
/// GET /api/chart-data
pub async fn get_chart_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<PriceSeries>> {
    // 잘못된 통화는 캐시 키를 만들지 않고 바로 거절
    Currency::new(&query.currency)
        .map_err(|e| ApiError::bad_request("INVALID_CURRENCY", e.to_string()))?;

    let series = state
        .chart
        .get_chart_data(&query.currency, &query.timeframe)
        .await;
    debug!(
        currency = %query.currency,
        timeframe = %query.timeframe,
        points = series.len(),
        "chart-data 응답"
    );

    Ok(Json(series))
}

/// 차트 라우터 (`/api/chart-data`에 nest).
pub fn chart_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_chart_data))
}
