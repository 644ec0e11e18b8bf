use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mapping table for claim tokens <-> startups they authorize.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claim_token_targets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub claim_token_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub startup_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
