//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러가 `State<Arc<AppState>>`로 접근합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stock_core::CandleSource;
use stock_data::{BackfillService, HistoryStore};
use stock_exchange::FyersClient;

use crate::config::ApiConfig;

/// API 서버 공유 상태.
pub struct AppState {
    /// 심볼/캔들/자격증명 저장소
    pub store: Arc<dyn HistoryStore>,

    /// 캔들 데이터 소스 (미설정 시 백필 불가)
    pub source: Option<Arc<dyn CandleSource>>,

    /// Fyers 클라이언트 (인증 라우트용)
    pub fyers: Option<Arc<FyersClient>>,

    /// 서버 설정
    pub config: ApiConfig,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소와 설정으로 상태 생성.
    pub fn new(store: Arc<dyn HistoryStore>, config: ApiConfig) -> Self {
        Self {
            store,
            source: None,
            fyers: None,
            config,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Fyers 클라이언트 설정.
    ///
    /// 인증 라우트와 백필 데이터 소스에 같은 클라이언트를 사용합니다.
    pub fn with_fyers(mut self, client: FyersClient) -> Self {
        let client = Arc::new(client);
        let source: Arc<dyn CandleSource> = client.clone();
        self.source = Some(source);
        self.fyers = Some(client);
        self
    }

    /// 캔들 데이터 소스만 설정.
    pub fn with_source(mut self, source: Arc<dyn CandleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// 설정된 데이터 소스로 백필 서비스 생성.
    pub fn backfill_service(&self) -> Option<BackfillService> {
        let source = self.source.clone()?;
        Some(
            BackfillService::new(self.store.clone(), source)
                .with_chunk_days(self.config.backfill_chunk_days),
        )
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}

/// 테스트용 상태 생성 (인메모리 저장소, 데이터 소스 없음).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    AppState::new(
        Arc::new(stock_data::MemoryHistoryStore::new()),
        ApiConfig::default(),
    )
}
