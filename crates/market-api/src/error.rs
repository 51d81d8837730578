//! API 에러 응답 타입.
//!
//! 모든 엔드포인트가 같은 형식으로 에러를 반환합니다.
//!
//! ```json
//! {
//!   "code": "INVALID_CURRENCY",
//!   "message": "잘못된 입력: 지원하지 않는 통화 코드: 'us dollar'",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_CURRENCY", "UPSTREAM_UNAVAILABLE")
    pub code: String,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
    /// Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상태 코드와 묶어 핸들러 에러로 변환합니다.
    pub fn with_status(self, status: StatusCode) -> ApiError {
        ApiError {
            status,
            body: self,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 상태 코드가 포함된 핸들러 에러.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorResponse,
}

impl ApiError {
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        ApiErrorResponse::new(code, message).with_status(StatusCode::BAD_REQUEST)
    }

    pub fn unavailable(code: &str, message: impl Into<String>) -> Self {
        ApiErrorResponse::new(code, message).with_status(StatusCode::SERVICE_UNAVAILABLE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("INVALID_CURRENCY", "bad");
        assert_eq!(error.code, "INVALID_CURRENCY");
        assert!(error.timestamp.is_some());
        assert_eq!(error.to_string(), "[INVALID_CURRENCY] bad");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::bad_request("INVALID_CURRENCY", "bad").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::unavailable("UPSTREAM_UNAVAILABLE", "down").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
