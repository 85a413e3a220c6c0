//! 캔들 히스토리 저장 및 증분 백필.
//!
//! 이 crate는 다음을 제공합니다:
//! - `HistoryStore` 저장소 추상화 (PostgreSQL, 인메모리)
//! - 충돌 무시(ON CONFLICT DO NOTHING) 일괄 저장
//! - 구간 분할 조회 후 저장하는 백필 서비스

pub mod backfill;
pub mod error;
pub mod storage;

pub use backfill::{BackfillError, BackfillOutcome, BackfillReport, BackfillService};
pub use error::{DataError, Result};
pub use storage::memory::MemoryHistoryStore;
pub use storage::postgres::{Database, DatabaseConfig, PgHistoryStore};
pub use storage::HistoryStore;
