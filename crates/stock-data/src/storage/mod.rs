//! 히스토리 저장소.
//!
//! - [`postgres`]: sqlx 기반 PostgreSQL 구현
//! - [`memory`]: 테스트/개발용 인메모리 구현

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stock_core::{Candle, Credential, NewCandle, Series, SeriesKey};

use crate::error::Result;

/// 한 번의 일괄 INSERT에 담는 최대 행 수.
pub const INSERT_BATCH_SIZE: usize = 500;

/// 심볼/캔들/자격증명 저장소.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// 저장소 연결 확인.
    async fn ping(&self) -> Result<()>;

    /// 키에 해당하는 활성 심볼 조회.
    async fn find_active_series(&self, key: &SeriesKey) -> Result<Option<Series>>;

    /// 전체 심볼 목록 (id 순).
    async fn list_series(&self) -> Result<Vec<Series>>;

    /// 심볼 등록.
    ///
    /// 같은 키의 행이 이미 있으면 새로 만들지 않고 활성화합니다.
    async fn register_series(&self, key: &SeriesKey) -> Result<Series>;

    /// 연동 이름으로 자격증명 조회.
    async fn get_credential(&self, website: &str) -> Result<Option<Credential>>;

    /// 자격증명 저장 (연동 이름 기준 덮어쓰기).
    async fn upsert_credential(
        &self,
        website: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Credential>;

    /// 심볼의 마지막 캔들 시각.
    async fn last_candle_time(&self, series_id: i32) -> Result<Option<DateTime<Utc>>>;

    /// 캔들 일괄 저장.
    ///
    /// 하나의 트랜잭션에서 실행되며 `(timestamp, series_id)`가 이미 있는 행은
    /// 무시합니다. 실제로 추가된 행 수를 반환합니다.
    async fn insert_candles(&self, series_id: i32, candles: &[NewCandle]) -> Result<u64>;

    /// `since` 이후(포함) 캔들을 시간순으로 조회.
    async fn candles_since(&self, series_id: i32, since: DateTime<Utc>) -> Result<Vec<Candle>>;
}
