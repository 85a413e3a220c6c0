//! 거래소 에러 타입.

use stock_core::SourceError;
use thiserror::Error;

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 업스트림이 요청을 거부함 (원본 응답 포함)
    #[error("Rejected: {message}")]
    Rejected {
        message: String,
        payload: serde_json::Value,
    },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else {
            ExchangeError::NetworkError(err.to_string())
        }
    }
}

impl From<ExchangeError> for SourceError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::NetworkError(msg) | ExchangeError::Timeout(msg) => {
                SourceError::Network(msg)
            }
            ExchangeError::Unauthorized(msg) => SourceError::Authentication(msg),
            other => SourceError::Other(other.to_string()),
        }
    }
}
