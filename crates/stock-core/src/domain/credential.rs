//! 외부 연동 자격증명 (접근/갱신 토큰).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fyers 연동 이름 (`third_party_tokens.website`).
pub const FYERS_INTEGRATION: &str = "fyers";

/// `third_party_tokens` 테이블 레코드.
///
/// 연동 이름(`website`)당 한 행만 존재하며, 재인증 시 기존 행을 덮어씁니다.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Credential {
    pub id: i32,
    /// 연동 이름 (예: "fyers")
    pub website: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// 사용 가능한 접근 토큰 반환 (없거나 빈 문자열이면 `None`).
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 토큰 값은 로그에 남기지 않음
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("website", &self.website)
            .field("has_access_token", &self.access_token().is_some())
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
