use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, TransactionTrait};
use tracing::info;

use entity::{claim_token, claim_token_target};

use crate::error::ClaimError;

/// Delete claim tokens whose expiry has passed, along with their targets.
///
/// Garbage collection only: expired tokens are already rejected on verify.
/// Returns the number of tokens removed.
pub async fn sweep_expired_tokens<C>(db: &C, now: i64) -> Result<u64, ClaimError>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let expired: Vec<String> = claim_token::Entity::find()
        .select_only()
        .column(claim_token::Column::Id)
        .filter(claim_token::Column::ExpiresAt.lt(now))
        .into_tuple()
        .all(&txn)
        .await?;

    if expired.is_empty() {
        txn.commit().await?;
        return Ok(0);
    }

    // libSQL does not always enforce the cascade, so remove targets explicitly.
    claim_token_target::Entity::delete_many()
        .filter(claim_token_target::Column::ClaimTokenId.is_in(expired.clone()))
        .exec(&txn)
        .await?;

    let deleted = claim_token::Entity::delete_many()
        .filter(claim_token::Column::Id.is_in(expired))
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;

    info!(deleted, "Swept expired claim tokens");
    Ok(deleted)
}
