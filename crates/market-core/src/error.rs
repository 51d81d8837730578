//! 도메인 에러 타입.
//!
//! 캐시 로직에 진입하기 전 단계(입력 검증, 설정 로드)에서 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum MarketError {
    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type MarketResult<T> = Result<T, MarketError>;

impl From<config::ConfigError> for MarketError {
    fn from(err: config::ConfigError) -> Self {
        MarketError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::InvalidInput("currency 'u$d'".to_string());
        assert_eq!(err.to_string(), "잘못된 입력: currency 'u$d'");
    }
}
