use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-use claim link token.
///
/// The raw token is delivered by email and looked up by exact match. A row is
/// usable while `used_at` is null and the current time is before `expires_at`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "claim_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Opaque token (base64url, 32 random bytes).
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,

    pub email: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub expires_at: i64,

    /// Unix timestamp (seconds). Set once, when the claim is applied.
    pub used_at: Option<i64>,

    /// Number of listings the token was issued for.
    pub target_count: i32,
}

impl Model {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
