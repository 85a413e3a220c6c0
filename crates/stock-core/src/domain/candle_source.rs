//! 캔들 데이터 소스 추상화.
//!
//! 업스트림 히스토리 API를 백필 오케스트레이션과 분리하기 위한
//! 거래소 중립적인 인터페이스를 제공합니다.

use async_trait::async_trait;
use thiserror::Error;

use super::HistoryResponse;
use crate::types::DateRange;

// =============================================================================
// 에러 타입
// =============================================================================

/// CandleSource 에러 (전송 계층 실패).
///
/// 업스트림이 에러 형태의 응답을 돌려준 경우는 에러가 아니라
/// [`HistoryResponse::Failure`]로 표현됩니다.
#[derive(Debug, Error)]
pub enum SourceError {
    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 인증 실패
    #[error("인증 실패: {0}")]
    Authentication(String),

    /// 기타 에러
    #[error("기타 에러: {0}")]
    Other(String),
}

// =============================================================================
// CandleSource Trait
// =============================================================================

/// 일봉 캔들 데이터 소스.
///
/// 구간 하나에 대한 요청을 한 번 수행하며, 내부적으로 재시도하지 않습니다.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// 구간 `[range.start, range.end]`의 일봉 조회.
    ///
    /// # Arguments
    /// * `access_token` - 저장된 접근 토큰
    /// * `symbol` - 업스트림 심볼 (예: "NSE:NIFTY50-INDEX")
    /// * `range` - 조회 구간
    async fn fetch_daily(
        &self,
        access_token: &str,
        symbol: &str,
        range: &DateRange,
    ) -> Result<HistoryResponse, SourceError>;
}
