use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Founder account.
///
/// Accounts are created lazily the first time a claim link for an address is
/// redeemed. A user is only a back-reference for startups; ownership lives on
/// `startups.owner_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Trimmed, lower-cased address.
    #[sea_orm(unique)]
    pub email: String,

    pub name: Option<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
