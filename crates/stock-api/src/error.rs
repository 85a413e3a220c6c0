//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공하고,
//! 하위 crate 에러를 HTTP 상태 코드로 변환합니다.
//!
//! | 에러 | 상태 | 코드 |
//! |------|------|------|
//! | 심볼 없음 | 404 | `SERIES_NOT_FOUND` |
//! | 자격증명 없음 | 404 | `CREDENTIAL_NOT_FOUND` |
//! | 업스트림 에러 응답 | 502 | `UPSTREAM_ERROR` |
//! | 업스트림 전송 실패 | 502 | `EXCHANGE_ERROR` |
//! | 저장소 오류 | 500 | `DB_ERROR` |
//! | 잘못된 입력 | 400 | `INVALID_INPUT` / `VALIDATION_ERROR` |

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stock_data::{BackfillError, DataError};
use stock_exchange::ExchangeError;
use tracing::error;
use validator::ValidationErrors;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "SERIES_NOT_FOUND",
///   "message": "심볼을 찾을 수 없습니다: NSE:SBIN-EQ@NSE",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "INVALID_INPUT")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (업스트림 원본 응답 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 에러 (상태 코드 + 본문).
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 상태 코드와 에러 본문 생성.
pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(ApiErrorResponse::new(code, message)))
}

/// 저장소 에러 변환.
pub fn data_error(err: DataError) -> ApiError {
    error!(error = %err, "Storage error");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", err.to_string())
}

/// 거래소 에러 변환.
///
/// 업스트림이 거부한 경우 원본 응답을 `details`에 담습니다.
pub fn exchange_error(err: ExchangeError) -> ApiError {
    match err {
        ExchangeError::Rejected { message, payload } => (
            StatusCode::BAD_GATEWAY,
            Json(ApiErrorResponse::with_details(
                "UPSTREAM_ERROR",
                message,
                payload,
            )),
        ),
        ExchangeError::Config(msg) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg)
        }
        other => api_error(StatusCode::BAD_GATEWAY, "EXCHANGE_ERROR", other.to_string()),
    }
}

/// 백필 에러 변환.
pub fn backfill_error(err: BackfillError) -> ApiError {
    match err {
        BackfillError::SeriesNotFound(key) => api_error(
            StatusCode::NOT_FOUND,
            "SERIES_NOT_FOUND",
            format!("심볼을 찾을 수 없습니다: {}", key),
        ),
        BackfillError::CredentialNotFound(website) => api_error(
            StatusCode::NOT_FOUND,
            "CREDENTIAL_NOT_FOUND",
            format!("'{}' 접근 토큰이 없습니다. 먼저 인증을 진행하세요", website),
        ),
        BackfillError::InvalidInput(e) => {
            api_error(StatusCode::BAD_REQUEST, "INVALID_INPUT", e.to_string())
        }
        BackfillError::Upstream {
            range,
            reason,
            payload,
        } => (
            StatusCode::BAD_GATEWAY,
            Json(ApiErrorResponse::with_details(
                "UPSTREAM_ERROR",
                format!("{} 구간 조회 실패: {}", range, reason),
                payload,
            )),
        ),
        BackfillError::Source(e) => {
            api_error(StatusCode::BAD_GATEWAY, "EXCHANGE_ERROR", e.to_string())
        }
        BackfillError::Data(e) => data_error(e),
    }
}

/// 요청 본문 검증 에러 변환.
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    api_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stock_core::{DateRange, SeriesKey};

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_json_omits_empty_details() {
        let error = ApiErrorResponse::new("NOT_FOUND", "Resource not found");
        let json = serde_json::to_string(&error).unwrap();

        assert!(!json.contains("details"));
        assert!(json.contains(r#""code":"NOT_FOUND""#));
    }

    #[test]
    fn test_backfill_error_status_codes() {
        let key = SeriesKey::new("NSE:SBIN-EQ", "NSE");
        assert_eq!(
            backfill_error(BackfillError::SeriesNotFound(key)).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            backfill_error(BackfillError::CredentialNotFound("fyers".into())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            backfill_error(BackfillError::Data(DataError::PoolExhausted)).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_error_carries_payload() {
        let range = DateRange::new(chrono::Utc::now(), chrono::Utc::now()).unwrap();
        let payload = json!({"s": "error", "message": "invalid token"});

        let (status, Json(body)) = backfill_error(BackfillError::Upstream {
            range,
            reason: "invalid token".to_string(),
            payload: payload.clone(),
        });

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "UPSTREAM_ERROR");
        assert_eq!(body.details, Some(payload));
    }

    #[test]
    fn test_rejected_token_exchange_is_upstream_error() {
        let payload = json!({"s": "error", "code": -413});
        let (status, Json(body)) = exchange_error(ExchangeError::Rejected {
            message: "no token".to_string(),
            payload: payload.clone(),
        });

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "UPSTREAM_ERROR");
        assert_eq!(body.details, Some(payload));

        let (status, Json(body)) = exchange_error(ExchangeError::Timeout("30s".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "EXCHANGE_ERROR");
    }
}
