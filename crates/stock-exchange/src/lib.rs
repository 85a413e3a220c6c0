//! 증권사 API 연결.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Fyers 인증 코드 URL 생성 및 토큰 발급
//! - Fyers 일봉 히스토리 조회 (`CandleSource` 구현)
//! - 거래소 에러 타입

pub mod connector;
pub mod error;

pub use connector::fyers::{parse_history_payload, FyersClient, FyersConfig, TokenGrant};
pub use error::*;
