//! 핵심 도메인 에러 타입.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// 시작 시각이 종료 시각보다 늦음
    #[error("잘못된 범위: 시작({start})이 종료({end})보다 늦습니다")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// 분할 간격이 0 이하
    #[error("잘못된 분할 간격: {0}초")]
    InvalidSpan(i64),

    /// 표현할 수 없는 연도
    #[error("잘못된 연도: {0}")]
    InvalidYear(i32),

    /// 원본 캔들 디코딩 실패
    #[error("캔들 디코딩 실패: {0}")]
    InvalidCandle(String),
}

/// 핵심 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
