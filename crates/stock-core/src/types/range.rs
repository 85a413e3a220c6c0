//! 날짜 범위 분할 및 증분 백필 계획.
//!
//! 업스트림 히스토리 API는 한 번의 요청으로 조회할 수 있는 기간이 제한되어 있으므로,
//! 누락 구간을 계산한 뒤 요청 가능한 크기의 청크로 나누어 순서대로 조회합니다.
//!
//! # 동작 방식
//!
//! 1. [`BackfillPlanner::plan`]: 마지막 저장 시각(없으면 기준 시작일)부터 현재까지의 구간 계산
//! 2. [`split_range`]: 구간을 `max_span` 이하의 연속된 청크로 분할
//!
//! 모든 시각은 UTC이며, 시간 단위는 1일입니다.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::SeriesKey;
use crate::error::{CoreError, CoreResult};

/// 일봉 기본 청크 크기 (일). 업스트림 일봉 조회 한도는 요청당 1년 미만입니다.
pub const DEFAULT_CHUNK_DAYS: i64 = 364;

/// 캔들 시간 단위 (1일).
pub fn time_unit() -> Duration {
    Duration::days(1)
}

/// 해당 연도 1월 1일 00:00 UTC.
pub fn year_start(year: i32) -> CoreResult<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or(CoreError::InvalidYear(year))
}

/// 양 끝을 포함하는 시간 구간 `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// 시작 시각 (포함)
    pub start: DateTime<Utc>,
    /// 종료 시각 (포함)
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// 새 구간 생성. `start <= end`가 아니면 에러.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// 구간 길이.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// 시각이 구간에 포함되는지 확인.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// `[start, end]` 구간을 `max_span` 이하 길이의 연속 청크로 분할합니다.
///
/// 첫 청크는 `[start, min(start + max_span, end)]`이고, 이후 청크는 직전 청크 종료
/// 시각의 1일 뒤에서 시작합니다. 청크 종료가 `end`에 도달하거나 다음 시작이 `end`를
/// 넘으면 종료합니다. `start == end`이면 `[start, start]` 하나를 반환합니다.
///
/// 마지막 청크 뒤에 1일 미만의 꼬리 구간이 남을 수 있으며, 이 구간은 분할하지 않고
/// 다음 백필 실행에서 마지막 저장 시점부터 다시 계획됩니다.
///
/// # Errors
/// - `CoreError::InvalidRange`: `start > end`
/// - `CoreError::InvalidSpan`: `max_span <= 0`
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use stock_core::split_range;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
/// let chunks = split_range(start, end, Duration::days(4)).unwrap();
///
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].start, start + Duration::days(5));
/// assert_eq!(chunks[1].end, end);
/// ```
pub fn split_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_span: Duration,
) -> CoreResult<Vec<DateRange>> {
    if start > end {
        return Err(CoreError::InvalidRange { start, end });
    }
    if max_span <= Duration::zero() {
        return Err(CoreError::InvalidSpan(max_span.num_seconds()));
    }

    let unit = time_unit();
    let mut chunks = Vec::new();
    let mut current = start;

    loop {
        let chunk_end = current
            .checked_add_signed(max_span)
            .map_or(end, |t| t.min(end));
        chunks.push(DateRange {
            start: current,
            end: chunk_end,
        });

        if chunk_end >= end {
            break;
        }

        match chunk_end.checked_add_signed(unit) {
            Some(next) if next <= end => current = next,
            _ => break,
        }
    }

    Ok(chunks)
}

/// 백필 계획 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillPlan {
    /// 조회가 필요한 구간
    Fetch { series: SeriesKey, range: DateRange },
    /// 이미 최신 상태 (다음 조회 시작 시각이 현재보다 뒤)
    UpToDate {
        series: SeriesKey,
        next_start: DateTime<Utc>,
    },
}

impl BackfillPlan {
    /// 조회 구간 반환 (최신 상태면 `None`).
    pub fn range(&self) -> Option<DateRange> {
        match self {
            BackfillPlan::Fetch { range, .. } => Some(*range),
            BackfillPlan::UpToDate { .. } => None,
        }
    }

    /// 대상 심볼 키.
    pub fn series(&self) -> &SeriesKey {
        match self {
            BackfillPlan::Fetch { series, .. } | BackfillPlan::UpToDate { series, .. } => series,
        }
    }
}

/// 증분 백필 계획기.
///
/// 저장된 데이터가 없을 때 사용할 기준 시작 시각(`epoch`)을 보관합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillPlanner {
    epoch: DateTime<Utc>,
}

impl BackfillPlanner {
    /// 기준 시작 시각으로 계획기 생성.
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch }
    }

    /// 특정 연도 1월 1일을 기준 시작 시각으로 하는 계획기 생성.
    pub fn from_year(year: i32) -> CoreResult<Self> {
        Ok(Self::new(year_start(year)?))
    }

    /// 기준 시작 시각.
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// 조회 구간 계산.
    ///
    /// - 마지막 저장 시각이 있으면 그 1일 뒤부터, 없으면 `epoch`부터
    /// - 종료는 항상 `now`
    /// - 시작이 `now`보다 뒤면 [`BackfillPlan::UpToDate`]
    pub fn plan(
        &self,
        series: &SeriesKey,
        last_stored: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> BackfillPlan {
        let fetch_start = match last_stored {
            Some(last) => last.checked_add_signed(time_unit()).unwrap_or(last),
            None => self.epoch,
        };

        if fetch_start > now {
            debug!(series = %series, next_start = %fetch_start, "저장 데이터가 최신 상태");
            return BackfillPlan::UpToDate {
                series: series.clone(),
                next_start: fetch_start,
            };
        }

        BackfillPlan::Fetch {
            series: series.clone(),
            range: DateRange {
                start: fetch_start,
                end: now,
            },
        }
    }
}
