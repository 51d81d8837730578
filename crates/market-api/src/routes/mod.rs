//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/api/health` - 상태와 캐시 통계
//! - `/api/chart-data` - 통화×기간별 가격 시계열
//! - `/api/market-data` - 시세 스냅샷

pub mod chart;
pub mod health;
pub mod market;

pub use chart::{chart_router, ChartQuery};
pub use health::{health_router, HealthResponse};
pub use market::market_router;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .route("/api/health", get(health::api_health))
        .nest("/api/chart-data", chart_router())
        .nest("/api/market-data", market_router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_all_routes_mounted() {
        let state = Arc::new(create_test_state());

        for uri in [
            "/health",
            "/api/health",
            "/api/chart-data?currency=eur&timeframe=ytd",
            "/api/market-data",
        ] {
            let app = create_api_router().with_state(state.clone());
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_api_router().with_state(Arc::new(create_test_state()));
        let response = app
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
