//! Fyers 인증 모듈.
//!
//! 처리 기능:
//! - 인증 코드 발급 URL 생성 (GET /generate-authcode)
//! - 인증 코드 → 접근 토큰 교환 (POST /validate-authcode)

use reqwest::Url;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use super::FyersClient;
use crate::ExchangeError;

/// 토큰 교환 결과.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// 접근 토큰
    pub access_token: String,
    /// 갱신 토큰 (응답에 없으면 `None`)
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ValidateAuthCodeRequest<'a> {
    grant_type: &'a str,
    #[serde(rename = "appIdHash")]
    app_id_hash: String,
    code: &'a str,
}

impl FyersClient {
    /// 사용자를 보낼 인증 코드 발급 URL.
    ///
    /// # Errors
    /// API URL이 올바른 URL이 아니면 `ExchangeError::Config`.
    pub fn auth_code_url(&self, state: &str) -> Result<Url, ExchangeError> {
        let base = format!("{}/generate-authcode", self.config.api_base_url);
        Url::parse_with_params(
            &base,
            &[
                ("client_id", self.config.app_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("response_type", "code"),
                ("state", state),
            ],
        )
        .map_err(|e| ExchangeError::Config(format!("잘못된 Fyers API URL '{}': {}", base, e)))
    }

    /// `sha256("{app_id}:{secret}")`의 16진수 문자열.
    pub fn app_id_hash(&self) -> String {
        let digest = Sha256::digest(format!("{}:{}", self.config.app_id, self.config.secret()));
        hex::encode(digest)
    }

    /// 인증 코드를 접근 토큰으로 교환.
    ///
    /// # Errors
    /// - 전송 실패: `NetworkError` / `Timeout`
    /// - 응답이 JSON이 아님: `ParseError`
    /// - 응답에 접근 토큰이 없음: `Rejected` (원본 응답 포함)
    pub async fn exchange_auth_code(&self, auth_code: &str) -> Result<TokenGrant, ExchangeError> {
        let url = format!("{}/validate-authcode", self.config.api_base_url);

        info!(app_id = %self.config.app_id, "Exchanging Fyers auth code for access token");

        let request_body = ValidateAuthCodeRequest {
            grant_type: "authorization_code",
            app_id_hash: self.app_id_hash(),
            code: auth_code,
        };

        let response = self.client.post(&url).json(&request_body).send().await?;

        let status = response.status();
        let body = response.text().await?;

        let payload: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            error!(%status, "Token response is not JSON: {}", body);
            ExchangeError::ParseError(format!("토큰 응답 파싱 실패: {}", e))
        })?;

        let access_token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty());

        let Some(access_token) = access_token else {
            let message = payload
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("접근 토큰 없음")
                .to_string();
            error!(%status, "Fyers token exchange rejected: {}", message);
            return Err(ExchangeError::Rejected { message, payload });
        };

        let refresh_token = payload
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        info!("Fyers access token obtained");

        Ok(TokenGrant {
            access_token: access_token.to_string(),
            refresh_token,
        })
    }
}
