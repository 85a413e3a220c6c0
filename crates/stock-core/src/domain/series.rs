//! 추적 심볼 (Series).

use serde::{Deserialize, Serialize};

/// 심볼 식별 키 (티커 + 거래소).
///
/// 티커는 업스트림 형식을 그대로 사용합니다 (예: `"NSE:NIFTY50-INDEX"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// 업스트림 심볼
    pub ticker: String,
    /// 거래소 코드 (예: "NSE")
    pub exchange: String,
}

impl SeriesKey {
    /// 새 키 생성.
    pub fn new(ticker: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: exchange.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.ticker, self.exchange)
    }
}

/// `symbol_master` 테이블 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Series {
    pub id: i32,
    pub ticker: String,
    pub exchange: String,
    pub is_active: bool,
}

impl Series {
    /// 식별 키 반환.
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.ticker.clone(), self.exchange.clone())
    }
}
