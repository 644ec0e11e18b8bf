use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use entity::{claim_token, startup, user};

use super::verify::VerifiedClaim;
use crate::error::ClaimError;
use crate::util::{display_name_from_email, uuid_v4};

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub user: user::Model,
    /// `true` when the account was created by this claim.
    pub user_created: bool,
    /// The listings now owned by `user`, ordered by name.
    pub startups: Vec<startup::Model>,
}

/// Link the verified token's listings to the account for its email and
/// consume the token.
///
/// Runs as one transaction. The token is consumed with
/// `UPDATE .. WHERE used_at IS NULL AND expires_at > now` and listings are
/// taken with `WHERE owner_id IS NULL`; if another request got there first
/// either update comes up short, the transaction is rolled back and the
/// caller sees [`ClaimError::InvalidOrExpired`].
pub async fn apply<C>(
    db: &C,
    verified: &VerifiedClaim,
    now: i64,
) -> Result<ClaimOutcome, ClaimError>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let consumed = claim_token::Entity::update_many()
        .col_expr(claim_token::Column::UsedAt, Expr::value(now))
        .filter(claim_token::Column::Id.eq(&verified.token.id))
        .filter(claim_token::Column::UsedAt.is_null())
        .filter(claim_token::Column::ExpiresAt.gt(now))
        .exec(&txn)
        .await?;
    if consumed.rows_affected != 1 {
        txn.rollback().await?;
        warn!(claim_token_id = %verified.token.id, "Claim lost the race for its token");
        return Err(ClaimError::InvalidOrExpired);
    }

    let (user, user_created) = find_or_create_user(&txn, verified.email(), now).await?;

    let startup_ids = verified.startup_ids();
    let expected = usize::try_from(verified.token.target_count).unwrap_or_default();
    let taken = startup::Entity::update_many()
        .col_expr(startup::Column::OwnerId, Expr::value(user.id.clone()))
        .col_expr(startup::Column::OwnedAt, Expr::value(now))
        .col_expr(startup::Column::UpdatedAt, Expr::value(now))
        .filter(startup::Column::Id.is_in(startup_ids.clone()))
        .filter(startup::Column::OwnerId.is_null())
        .exec(&txn)
        .await?;
    if expected == 0 || startup_ids.len() != expected || taken.rows_affected != expected as u64 {
        txn.rollback().await?;
        warn!(
            claim_token_id = %verified.token.id,
            expected,
            taken = taken.rows_affected,
            "Claim target was owned or removed concurrently"
        );
        return Err(ClaimError::InvalidOrExpired);
    }

    let startups = startup::Entity::find()
        .filter(startup::Column::Id.is_in(startup_ids))
        .order_by_asc(startup::Column::Name)
        .all(&txn)
        .await?;

    txn.commit().await?;

    info!(
        claim_token_id = %verified.token.id,
        user_id = %user.id,
        user_created,
        startups = startups.len(),
        "Applied claim"
    );

    Ok(ClaimOutcome {
        user,
        user_created,
        startups,
    })
}

async fn find_or_create_user(
    txn: &DatabaseTransaction,
    email: &str,
    now: i64,
) -> Result<(user::Model, bool), ClaimError> {
    if let Some(existing) = find_user(txn, email).await? {
        return Ok((existing, false));
    }

    let row = user::ActiveModel {
        id: Set(uuid_v4()),
        email: Set(email.to_string()),
        name: Set(Some(display_name_from_email(email))),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = user::Entity::insert(row)
        .on_conflict(
            OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await?;

    let created = find_user(txn, email).await?.ok_or_else(|| {
        ClaimError::Db(sea_orm::DbErr::RecordNotFound(
            "user for claim email vanished after insert".to_string(),
        ))
    })?;

    Ok((created, inserted == 1))
}

async fn find_user<C>(db: &C, email: &str) -> Result<Option<user::Model>, ClaimError>
where
    C: ConnectionTrait,
{
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}
