//! 증분 백필 서비스.
//!
//! 저장된 마지막 캔들 이후부터 현재까지를 구간으로 나눠 순서대로 조회하고,
//! 모든 구간이 성공한 경우에만 한 번에 저장합니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use stock_core::{
    split_range, BackfillPlan, BackfillPlanner, CandleSource, CoreError, DateRange,
    HistoryResponse, NewCandle, RawCandle, SeriesKey, SourceError, DEFAULT_CHUNK_DAYS,
    FYERS_INTEGRATION,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::error::DataError;
use crate::storage::HistoryStore;

/// 백필 실패 원인.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// 활성 심볼 없음
    #[error("Series not found: {0}")]
    SeriesNotFound(SeriesKey),

    /// 자격증명 없음 (또는 접근 토큰이 비어 있음)
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    /// 잘못된 입력 (연도, 구간)
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// 업스트림이 에러 형태로 응답함
    #[error("Upstream error for {range}: {reason}")]
    Upstream {
        range: DateRange,
        reason: String,
        payload: serde_json::Value,
    },

    /// 업스트림 요청 자체가 실패함
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// 저장소 오류
    #[error("Storage error: {0}")]
    Data(#[from] DataError),
}

/// 백필 결과 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub series: SeriesKey,
    pub fetch_start: DateTime<Utc>,
    pub fetch_end: DateTime<Utc>,
    /// 요청한 구간 수
    pub chunks: usize,
    /// 업스트림에서 받은 캔들 수
    pub fetched: usize,
    /// 실제로 추가된 행 수
    pub inserted: u64,
}

impl BackfillReport {
    /// 결과 요약 로그.
    pub fn log_summary(&self, elapsed: std::time::Duration) {
        info!(
            series = %self.series,
            fetch_start = %self.fetch_start,
            fetch_end = %self.fetch_end,
            chunks = self.chunks,
            fetched = self.fetched,
            inserted = self.inserted,
            skipped = (self.fetched as u64).saturating_sub(self.inserted),
            elapsed = format!("{:.1}s", elapsed.as_secs_f64()),
            "백필 완료"
        );
    }
}

/// 백필 실행 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// 구간을 조회하고 저장함
    Completed(BackfillReport),
    /// 이미 최신 상태라 조회하지 않음
    UpToDate {
        series: SeriesKey,
        next_start: DateTime<Utc>,
    },
}

impl BackfillOutcome {
    /// 추가된 행 수 (최신 상태면 0).
    pub fn inserted(&self) -> u64 {
        match self {
            BackfillOutcome::Completed(report) => report.inserted,
            BackfillOutcome::UpToDate { .. } => 0,
        }
    }
}

/// 백필 오케스트레이션.
pub struct BackfillService {
    store: Arc<dyn HistoryStore>,
    source: Arc<dyn CandleSource>,
    chunk_span: Duration,
}

impl BackfillService {
    /// 기본 구간 길이(364일)로 서비스 생성.
    pub fn new(store: Arc<dyn HistoryStore>, source: Arc<dyn CandleSource>) -> Self {
        Self {
            store,
            source,
            chunk_span: Duration::days(DEFAULT_CHUNK_DAYS),
        }
    }

    /// 요청당 최대 구간 길이 설정.
    pub fn with_chunk_days(mut self, days: i64) -> Self {
        self.chunk_span = Duration::days(days);
        self
    }

    /// 현재 시각 기준 백필 실행.
    pub async fn run(
        &self,
        key: &SeriesKey,
        start_year: i32,
    ) -> Result<BackfillOutcome, BackfillError> {
        self.run_at(key, start_year, Utc::now()).await
    }

    /// `now`까지 백필 실행.
    ///
    /// 어느 한 구간이라도 실패하면 앞선 구간의 데이터도 저장하지 않습니다.
    #[instrument(skip(self), fields(series = %key))]
    pub async fn run_at(
        &self,
        key: &SeriesKey,
        start_year: i32,
        now: DateTime<Utc>,
    ) -> Result<BackfillOutcome, BackfillError> {
        let started = Instant::now();
        let planner = BackfillPlanner::from_year(start_year)?;

        let series = self
            .store
            .find_active_series(key)
            .await?
            .ok_or_else(|| BackfillError::SeriesNotFound(key.clone()))?;

        let credential = self
            .store
            .get_credential(FYERS_INTEGRATION)
            .await?
            .ok_or_else(|| BackfillError::CredentialNotFound(FYERS_INTEGRATION.to_string()))?;
        let access_token = credential
            .access_token()
            .ok_or_else(|| BackfillError::CredentialNotFound(FYERS_INTEGRATION.to_string()))?;

        let last_stored = self.store.last_candle_time(series.id).await?;
        let range = match planner.plan(key, last_stored, now) {
            BackfillPlan::Fetch { range, .. } => range,
            BackfillPlan::UpToDate { series, next_start } => {
                info!(next_start = %next_start, "이미 최신 상태, 조회 생략");
                return Ok(BackfillOutcome::UpToDate { series, next_start });
            }
        };

        let chunks = split_range(range.start, range.end, self.chunk_span)?;
        debug!(range = %range, chunks = chunks.len(), "구간 분할 완료");

        let mut raw: Vec<RawCandle> = Vec::new();
        for chunk in &chunks {
            match self
                .source
                .fetch_daily(access_token, &series.ticker, chunk)
                .await?
            {
                HistoryResponse::Candles(candles) => raw.extend(candles),
                HistoryResponse::Failure { reason, payload } => {
                    warn!(chunk = %chunk, "업스트림 에러 응답으로 백필 중단: {}", reason);
                    return Err(BackfillError::Upstream {
                        range: *chunk,
                        reason,
                        payload,
                    });
                }
            }
        }

        let candles = decode_all(&raw, &range)?;
        let inserted = self.store.insert_candles(series.id, &candles).await?;

        let report = BackfillReport {
            series: key.clone(),
            fetch_start: range.start,
            fetch_end: range.end,
            chunks: chunks.len(),
            fetched: raw.len(),
            inserted,
        };
        report.log_summary(started.elapsed());

        Ok(BackfillOutcome::Completed(report))
    }
}

/// 원본 캔들 전체 디코딩. 하나라도 잘못되면 업스트림 에러로 취급.
fn decode_all(raw: &[RawCandle], range: &DateRange) -> Result<Vec<NewCandle>, BackfillError> {
    raw.iter()
        .map(|candle| {
            candle.decode().map_err(|e| BackfillError::Upstream {
                range: *range,
                reason: e.to_string(),
                payload: serde_json::to_value(candle).unwrap_or(serde_json::Value::Null),
            })
        })
        .collect()
}
