//! 헬스 체크 endpoint.
//!
//! - `GET /health`: liveness (본문 "OK")
//! - `GET /api/health`: 상태, 버전, 업타임, 차트 캐시 통계

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use market_data::CacheStats;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 항상 "ok"
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    /// 현재 시간 (ISO 8601)
    pub timestamp: String,
    pub chart_cache: CacheStats,
}

/// 간단한 헬스 체크.
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크.
///
/// 업스트림 상태와 무관하게 200을 반환합니다.
/// GET /api/health
pub async fn api_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        chart_cache: state.chart.stats().await,
    })
}

/// liveness 라우터 (`/health`에 nest).
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health_check))
}
