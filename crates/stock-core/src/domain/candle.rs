//! 일봉 캔들 모델.
//!
//! - [`RawCandle`]: 업스트림 응답의 원본 튜플 `[timestamp, open, high, low, close, volume]`
//! - [`NewCandle`]: 저장 직전의 디코딩된 캔들
//! - [`Candle`]: `symbol_history` 테이블 레코드

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 업스트림 원본 캔들 튜플.
///
/// JSON 배열 `[1704153600, 21727.75, 21755.6, 21555.65, 21665.8, 0]` 형식으로
/// 직렬화/역직렬화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(i64, f64, f64, f64, f64, f64)",
    into = "(i64, f64, f64, f64, f64, f64)"
)]
pub struct RawCandle {
    /// 캔들 시각 (Unix epoch 초)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 거래량 (업스트림에 따라 실수로 전달될 수 있음)
    pub volume: f64,
}

impl From<(i64, f64, f64, f64, f64, f64)> for RawCandle {
    fn from((timestamp, open, high, low, close, volume): (i64, f64, f64, f64, f64, f64)) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl From<RawCandle> for (i64, f64, f64, f64, f64, f64) {
    fn from(c: RawCandle) -> Self {
        (c.timestamp, c.open, c.high, c.low, c.close, c.volume)
    }
}

impl RawCandle {
    /// 저장용 캔들로 디코딩.
    ///
    /// # Errors
    /// 시각이 표현 범위를 벗어나거나, 가격이 유한한 수가 아니거나,
    /// 거래량이 음수/소수이면 `CoreError::InvalidCandle`.
    pub fn decode(&self) -> CoreResult<NewCandle> {
        let timestamp = DateTime::from_timestamp(self.timestamp, 0).ok_or_else(|| {
            CoreError::InvalidCandle(format!("timestamp 범위 초과: {}", self.timestamp))
        })?;

        let volume = self.volume;
        if !volume.is_finite() || volume < 0.0 || volume.fract() != 0.0 || volume > i64::MAX as f64
        {
            return Err(CoreError::InvalidCandle(format!("잘못된 거래량: {}", volume)));
        }

        Ok(NewCandle {
            timestamp,
            open: to_decimal("open", self.open)?,
            high: to_decimal("high", self.high)?,
            low: to_decimal("low", self.low)?,
            close: to_decimal("close", self.close)?,
            volume: volume as i64,
        })
    }
}

fn to_decimal(field: &str, value: f64) -> CoreResult<Decimal> {
    // f64 Display는 최단 왕복 표현이므로 21727.75 → "21727.75"
    value
        .to_string()
        .parse::<Decimal>()
        .map_err(|_| CoreError::InvalidCandle(format!("{}: {}", field, value)))
}

/// 디코딩된 저장 대기 캔들 (심볼 ID는 저장 시 지정).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCandle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

/// `symbol_history` 테이블 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Candle {
    pub id: i64,
    /// 소속 심볼 ID (`symbol_master.id`)
    #[cfg_attr(feature = "sqlx-support", sqlx(rename = "symbol_master_id"))]
    pub series_id: i32,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl Candle {
    /// 일간 변동폭 (종가 - 시가).
    pub fn change(&self) -> Decimal {
        self.close - self.open
    }
}

/// 업스트림 히스토리 조회 결과.
///
/// 오케스트레이션은 두 경우를 모두 명시적으로 처리해야 합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryResponse {
    /// 성공 (데이터 없음은 빈 목록)
    Candles(Vec<RawCandle>),
    /// 에러 형태의 응답. `payload`는 진단용 원본 응답
    Failure {
        reason: String,
        payload: serde_json::Value,
    },
}

impl HistoryResponse {
    /// 실패 응답 생성.
    pub fn failure(reason: impl Into<String>, payload: serde_json::Value) -> Self {
        HistoryResponse::Failure {
            reason: reason.into(),
            payload,
        }
    }

    /// 성공 여부.
    pub fn is_success(&self) -> bool {
        matches!(self, HistoryResponse::Candles(_))
    }
}
