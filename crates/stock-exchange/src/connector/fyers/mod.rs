//! Fyers API v2 커넥터.
//!
//! - 인증 코드 URL 생성 및 토큰 교환 ([`auth`])
//! - 일봉 히스토리 조회 ([`history`])

pub mod auth;
pub mod config;
pub mod history;

pub use auth::TokenGrant;
pub use config::FyersConfig;
pub use history::parse_history_payload;

use reqwest::Client;

use crate::ExchangeError;

/// Fyers REST 클라이언트.
///
/// 토큰을 보관하지 않으며, 호출자가 저장된 접근 토큰을 요청마다 전달합니다.
#[derive(Debug)]
pub struct FyersClient {
    config: FyersConfig,
    client: Client,
}

impl FyersClient {
    /// 새로운 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: FyersConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 설정 반환.
    pub fn config(&self) -> &FyersConfig {
        &self.config
    }

    /// 데이터 API 인증 헤더 값 (`{app_id}:{access_token}`).
    fn auth_header(&self, access_token: &str) -> String {
        format!("{}:{}", self.config.app_id, access_token)
    }
}
