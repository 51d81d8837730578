//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 업스트림 조회 및 캐시 관련 오류.
///
/// 어느 경로에서도 프로세스를 중단시키지 않습니다. 백그라운드 갱신에서는
/// 로그로만 남고, 동기 조회에서는 Fallback 체인으로 흡수됩니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 업스트림 연결 실패, 비정상 상태 코드, 타임아웃
    #[error("Network error: {0}")]
    Network(String),

    /// 현재가를 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 예상과 다른 응답 형식
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataError::MalformedResponse(err.to_string())
        } else if err.is_timeout() {
            DataError::Network(format!("request timed out: {}", err))
        } else {
            DataError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::MalformedResponse(err.to_string())
    }
}

impl From<market_core::MarketError> for DataError {
    fn from(err: market_core::MarketError) -> Self {
        DataError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_is_malformed() {
        let err: DataError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, DataError::MalformedResponse(_)));
    }
}
