//! 시세 스냅샷 endpoint.
//!
//! `GET /api/market-data`: 통화별 BTC 가격과 시가총액, sat 값, ETF 시세.

use axum::{extract::State, routing::get, Json, Router};
use market_data::MarketSnapshot;
use std::sync::Arc;
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 시세 스냅샷 조회.
///
/// 처음 조회부터 업스트림이 실패해 보여줄 값이 없으면 503.
pub async fn get_market_data(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Arc<MarketSnapshot>>> {
    let snapshot = state.snapshot.snapshot().await.map_err(|e| {
        error!(error = %e, "시세 스냅샷 조회 실패");
        ApiError::unavailable("UPSTREAM_UNAVAILABLE", e.to_string())
    })?;

    Ok(Json(snapshot))
}

/// 시세 라우터 (`/api/market-data`에 nest).
pub fn market_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_market_data))
}
