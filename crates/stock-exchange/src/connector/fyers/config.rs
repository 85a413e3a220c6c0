//! Fyers API 설정.
//!
//! Fyers v2 API는 앱 ID와 시크릿으로 인증 코드를 토큰으로 교환하며,
//! 이후 요청은 `Authorization: {app_id}:{access_token}` 헤더를 사용합니다.

use secrecy::{ExposeSecret, SecretString};

/// 기본 API URL (인증 코드 발급/검증).
pub const DEFAULT_API_URL: &str = "https://api.fyers.in/api/v2";
/// 기본 데이터 URL (히스토리 조회).
pub const DEFAULT_DATA_URL: &str = "https://api.fyers.in/data-rest/v2";
/// 기본 요청 타임아웃 (초).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fyers API 설정.
pub struct FyersConfig {
    /// 앱 ID (client_id)
    pub app_id: String,
    /// 앱 시크릿
    pub secret_id: SecretString,
    /// 인증 완료 후 리다이렉트 URL
    pub redirect_url: String,
    /// 인증 API 기본 URL
    pub api_base_url: String,
    /// 데이터 API 기본 URL
    pub data_base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl FyersConfig {
    /// 새로운 Fyers 설정 생성.
    pub fn new(app_id: String, secret_id: String, redirect_url: String) -> Self {
        Self {
            app_id,
            secret_id: SecretString::new(secret_id.into()),
            redirect_url,
            api_base_url: DEFAULT_API_URL.to_string(),
            data_base_url: DEFAULT_DATA_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// 인증 API URL 설정 (테스트용 mock 서버 등).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = trim_trailing_slash(url.into());
        self
    }

    /// 데이터 API URL 설정.
    pub fn with_data_base_url(mut self, url: impl Into<String>) -> Self {
        self.data_base_url = trim_trailing_slash(url.into());
        self
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// 환경 변수에서 설정 생성.
    ///
    /// # 환경 변수
    /// - FYERS_APP_ID, FYERS_SECRET_ID, FYERS_REDIRECT_URL (필수)
    /// - FYERS_API_URL, FYERS_DATA_URL, FYERS_TIMEOUT_SECS (선택)
    ///
    /// 필수 값이 하나라도 없으면 `None`.
    pub fn from_env() -> Option<Self> {
        let app_id = non_empty_env("FYERS_APP_ID")?;
        let secret_id = non_empty_env("FYERS_SECRET_ID")?;
        let redirect_url = non_empty_env("FYERS_REDIRECT_URL")?;

        let mut config = Self::new(app_id, secret_id, redirect_url);
        if let Some(url) = non_empty_env("FYERS_API_URL") {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = non_empty_env("FYERS_DATA_URL") {
            config = config.with_data_base_url(url);
        }
        if let Some(secs) = non_empty_env("FYERS_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config = config.with_timeout_secs(secs);
        }

        Some(config)
    }

    /// 시크릿 원문 (appIdHash 계산용).
    pub(crate) fn secret(&self) -> &str {
        self.secret_id.expose_secret()
    }
}

impl std::fmt::Debug for FyersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FyersConfig")
            .field("app_id", &self.app_id)
            .field("redirect_url", &self.redirect_url)
            .field("api_base_url", &self.api_base_url)
            .field("data_base_url", &self.data_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FyersConfig::new(
            "APP-100".to_string(),
            "s3cret".to_string(),
            "http://localhost:3000/auth/fyers/callback".to_string(),
        );

        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.data_base_url, DEFAULT_DATA_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.secret(), "s3cret");
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let config = FyersConfig::new("a".into(), "b".into(), "c".into())
            .with_api_base_url("http://127.0.0.1:1234/")
            .with_data_base_url("http://127.0.0.1:5678//");

        assert_eq!(config.api_base_url, "http://127.0.0.1:1234");
        assert_eq!(config.data_base_url, "http://127.0.0.1:5678");
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = FyersConfig::new("APP-100".into(), "top-secret".into(), "c".into());
        let debug = format!("{:?}", config);
        assert!(debug.contains("APP-100"));
        assert!(!debug.contains("top-secret"));
    }
}
