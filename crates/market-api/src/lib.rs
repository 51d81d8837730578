//! # Market API
//!
//! 차트 데이터와 시세 스냅샷을 제공하는 Axum 기반 HTTP 서버.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use state::AppState;
