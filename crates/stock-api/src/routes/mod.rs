//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth/fyers` - Fyers 인증 시작 (리다이렉트)
//! - `/auth/fyers/callback` - 인증 코드 교환 및 토큰 저장
//! - `/api/v1/stocks/{symbol}` - 변동폭 히스토그램 조회(GET), 백필 실행(POST)
//! - `/api/v1/series` - 추적 심볼 목록/등록

pub mod auth;
pub mod health;
pub mod series;
pub mod stocks;

pub use auth::{auth_router, CallbackQuery, TokenStoredResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use series::{series_router, RegisterSeriesRequest, SeriesListResponse};
pub use stocks::{stocks_router, StockQuery};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 업스트림 인증
        .nest("/auth/fyers", auth_router())
        // API v1 엔드포인트
        .nest("/api/v1/stocks", stocks_router())
        .nest("/api/v1/series", series_router())
}
