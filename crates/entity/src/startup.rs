use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_APPROVED: &str = "APPROVED";
pub const STATUS_REJECTED: &str = "REJECTED";

/// A directory listing.
///
/// Listings are submitted anonymously with a founder email and become
/// claimable once an administrator approves them. `owner_id`/`owned_at` are
/// written together by the claim flow and never cleared by it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "startups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub founder_email: String,

    /// One of `PENDING`, `APPROVED`, `REJECTED`.
    pub status: String,

    pub owner_id: Option<String>,

    /// Unix timestamp (seconds).
    pub owned_at: Option<i64>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

impl Model {
    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
