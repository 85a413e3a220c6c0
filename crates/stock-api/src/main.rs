//! 일봉 히스토리 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 헬스 체크, Fyers 인증, 백필 실행, 히스토그램 조회 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use stock_api::config::ApiConfig;
use stock_api::routes::create_api_router;
use stock_api::state::AppState;
use stock_data::{Database, DatabaseConfig, PgHistoryStore};
use stock_exchange::{FyersClient, FyersConfig};

/// CORS 레이어 생성.
///
/// origin 목록이 없으면 모든 origin을 허용합니다 (개발 모드).
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let parsed: Vec<_> = origins
        .unwrap_or_default()
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let restricted = !parsed.is_empty();
    let allow_origin = match origins {
        Some(_) if restricted => {
            info!("CORS configured with {} allowed origins", parsed.len());
            AllowOrigin::list(parsed)
        }
        Some(_) => {
            warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
            AllowOrigin::any()
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 와일드카드 origin과 credentials는 함께 쓸 수 없음
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(state.config.cors_origins.as_deref());

    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(cors)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stock_api=info,stock_data=info,stock_exchange=info,tower_http=debug".into()
            }),
        )
        .init();

    info!("Starting stock history API server...");

    // 설정 로드
    let config = ApiConfig::from_env().map_err(|e| {
        error!(error = %e, "서버 설정을 불러오지 못했습니다");
        e
    })?;
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // 데이터베이스 연결 및 마이그레이션
    let db_config = DatabaseConfig::new(config.database_url.clone(), config.db_max_connections);
    let db = Database::connect(&db_config).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;
    db.migrate().await?;
    info!("Database connected and migrated");

    let store = Arc::new(PgHistoryStore::new(db));
    let mut state = AppState::new(store, config);

    // Fyers 설정 (없으면 인증/백필 비활성)
    match FyersConfig::from_env() {
        Some(fyers_config) => {
            let client = FyersClient::new(fyers_config)?;
            info!(app_id = %client.config().app_id, "Fyers client configured");
            state = state.with_fyers(client);
        }
        None => {
            warn!("FYERS_APP_ID/FYERS_SECRET_ID/FYERS_REDIRECT_URL not set, auth and backfill disabled");
        }
    }

    let app = create_router(Arc::new(state));

    info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM 대기.
///
/// 시그널 핸들러 설치에 실패하면 해당 시그널은 무시합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
