use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed-window request counter, keyed by an arbitrary identifier
/// (for example `claim:<client ip>`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rate_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    /// Unix timestamp (seconds) at which the current window opened.
    pub window_start: i64,

    pub count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
