//! 환경변수 기반 서버 설정.

use std::net::SocketAddr;

use stock_core::DEFAULT_CHUNK_DAYS;
use thiserror::Error;

/// 설정 로드 에러.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 필수 환경변수 누락
    #[error("{0} 환경변수가 설정되지 않았습니다")]
    Missing(&'static str),
}

/// API 서버 설정.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// 바인딩할 호스트 주소
    pub host: String,
    /// 바인딩할 포트
    pub port: u16,
    /// 데이터베이스 URL
    pub database_url: String,
    /// DB 풀 최대 연결 수
    pub db_max_connections: u32,
    /// 요청 전역 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 허용 CORS origin 목록 (없으면 모두 허용)
    pub cors_origins: Option<Vec<String>>,
    /// 심볼 조회 시 사용할 거래소
    pub series_exchange: String,
    /// 기본 백필 시작 연도
    pub backfill_start_year: i32,
    /// 요청당 최대 조회 일수
    pub backfill_chunk_days: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: String::new(),
            db_max_connections: 10,
            request_timeout_secs: 120,
            cors_origins: None,
            series_exchange: "NSE".to_string(),
            backfill_start_year: 2001,
            backfill_chunk_days: DEFAULT_CHUNK_DAYS,
        }
    }
}

impl ApiConfig {
    /// 환경변수에서 설정 로드.
    ///
    /// `DATABASE_URL`만 필수이며 나머지는 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let defaults = Self::default();
        let cors_origins = std::env::var("CORS_ORIGINS")
            .ok()
            .map(|origins| parse_list(&origins))
            .filter(|list| !list.is_empty());

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_var_parse("API_PORT", defaults.port),
            database_url,
            db_max_connections: env_var_parse("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            request_timeout_secs: env_var_parse(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            cors_origins,
            series_exchange: std::env::var("SERIES_EXCHANGE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.series_exchange),
            backfill_start_year: env_var_parse(
                "BACKFILL_START_YEAR",
                defaults.backfill_start_year,
            ),
            backfill_chunk_days: env_var_parse("BACKFILL_CHUNK_DAYS", defaults.backfill_chunk_days)
                .max(1),
        })
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 쉼표 구분 목록 파싱
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
