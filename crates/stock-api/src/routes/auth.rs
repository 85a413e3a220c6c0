//! Fyers 인증 endpoint.
//!
//! - `GET /auth/fyers`: 인증 코드 발급 페이지로 리다이렉트
//! - `GET /auth/fyers/callback?auth_code=…`: 코드를 토큰으로 교환 후 저장

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stock_core::FYERS_INTEGRATION;
use stock_exchange::FyersClient;
use tracing::info;

use crate::error::{api_error, data_error, exchange_error, ApiResult};
use crate::state::AppState;

/// 인증 요청에 실어 보내는 state 값.
const AUTH_STATE: &str = "stock-history";

/// 콜백 쿼리 파라미터.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// 업스트림이 발급한 인증 코드
    #[serde(default)]
    pub auth_code: Option<String>,
}

/// 토큰 저장 결과.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenStoredResponse {
    pub message: String,
    pub website: String,
    pub has_refresh_token: bool,
    pub updated_at: DateTime<Utc>,
}

fn fyers_client(state: &AppState) -> ApiResult<&FyersClient> {
    state.fyers.as_deref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "FYERS_NOT_CONFIGURED",
            "FYERS_APP_ID, FYERS_SECRET_ID, FYERS_REDIRECT_URL 환경변수를 설정하세요",
        )
    })
}

/// 인증 코드 발급 페이지로 리다이렉트.
///
/// GET /auth/fyers
pub async fn start_auth(State(state): State<Arc<AppState>>) -> ApiResult<Redirect> {
    let client = fyers_client(&state)?;
    let url = client.auth_code_url(AUTH_STATE).map_err(exchange_error)?;

    Ok(Redirect::temporary(url.as_str()))
}

/// 인증 코드 → 접근 토큰 교환 및 저장.
///
/// GET /auth/fyers/callback
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Json<TokenStoredResponse>> {
    let auth_code = query
        .auth_code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                "auth_code 파라미터가 없습니다",
            )
        })?;

    let client = fyers_client(&state)?;
    let grant = client
        .exchange_auth_code(&auth_code)
        .await
        .map_err(exchange_error)?;

    let credential = state
        .store
        .upsert_credential(
            FYERS_INTEGRATION,
            &grant.access_token,
            grant.refresh_token.as_deref(),
        )
        .await
        .map_err(data_error)?;

    info!(website = %credential.website, "Fyers 토큰 저장 완료");

    Ok(Json(TokenStoredResponse {
        message: "토큰이 저장되었습니다".to_string(),
        website: credential.website,
        has_refresh_token: credential.refresh_token.is_some(),
        updated_at: credential.updated_at,
    }))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(start_auth))
        .route("/callback", get(auth_callback))
}
