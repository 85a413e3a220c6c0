//! 일봉 히스토리 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - Fyers 인증 코드 교환 및 토큰 저장
//! - 일봉 백필 트리거와 변동폭 히스토그램 조회
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`config`]: 환경변수 기반 서버 설정
//! - [`error`]: API 에러 응답 포맷
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
