//! # Stock Core
//!
//! 일봉 히스토리 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 추적 심볼(Series), 캔들, 자격증명 모델
//! - 백필 계획 및 날짜 범위 분할
//! - 일간 변동폭 히스토그램
//! - 캔들 데이터 소스 추상화 (`CandleSource`)

pub mod domain;
pub mod error;
pub mod types;

pub use domain::*;
pub use error::*;
pub use types::*;
