use std::collections::BTreeSet;

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, error, info};

use entity::{claim_token, claim_token_target, startup};

use crate::error::ClaimError;
use crate::util::{generate_claim_token, uuid_v4};

/// Upper bound on token generation retries. With 256 bits of entropy a single
/// collision already points at a broken random source.
pub const MAX_TOKEN_ATTEMPTS: u32 = 10;

const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Approved, not yet owned listings submitted under `email`.
pub async fn claimable_startups<C>(db: &C, email: &str) -> Result<Vec<startup::Model>, ClaimError>
where
    C: ConnectionTrait,
{
    let startups = startup::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(startup::Column::FounderEmail))).eq(email))
        .filter(startup::Column::Status.eq(startup::STATUS_APPROVED))
        .filter(startup::Column::OwnerId.is_null())
        .order_by_asc(startup::Column::Name)
        .all(db)
        .await?;

    Ok(startups)
}

/// Issue a claim token for `email` covering `startup_ids`.
///
/// `email` is expected to be normalized already. The token and one target row
/// per listing are written in a single transaction; the raw token is returned
/// for the caller to deliver.
pub async fn issue<C>(
    db: &C,
    email: &str,
    startup_ids: &[String],
    ttl_hours: i64,
    now: i64,
) -> Result<String, ClaimError>
where
    C: ConnectionTrait + TransactionTrait,
{
    issue_with_generator(db, generate_claim_token, email, startup_ids, ttl_hours, now).await
}

pub(crate) async fn issue_with_generator<C, G>(
    db: &C,
    mut generate: G,
    email: &str,
    startup_ids: &[String],
    ttl_hours: i64,
    now: i64,
) -> Result<String, ClaimError>
where
    C: ConnectionTrait + TransactionTrait,
    G: FnMut() -> String,
{
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ClaimError::InvalidInput("Email is required".to_string()));
    }
    if ttl_hours < 0 {
        return Err(ClaimError::InvalidInput(
            "Token lifetime cannot be negative".to_string(),
        ));
    }

    let targets: BTreeSet<&str> = startup_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect();
    if targets.is_empty() {
        return Err(ClaimError::InvalidInput(
            "At least one startup ID is required".to_string(),
        ));
    }

    let known = startup::Entity::find()
        .filter(startup::Column::Id.is_in(targets.iter().copied()))
        .count(db)
        .await?;
    if known != targets.len() as u64 {
        return Err(ClaimError::InvalidInput("Unknown startup ID".to_string()));
    }

    let target_count = i32::try_from(targets.len())
        .map_err(|_| ClaimError::InvalidInput("Too many startup IDs".to_string()))?;

    let token = unique_token(db, &mut generate).await?;

    let txn = db.begin().await?;

    let row = claim_token::ActiveModel {
        id: Set(uuid_v4()),
        token: Set(token.clone()),
        email: Set(email),
        created_at: Set(now),
        expires_at: Set(now.saturating_add(ttl_hours.saturating_mul(SECONDS_PER_HOUR))),
        used_at: Set(None),
        target_count: Set(target_count),
    }
    .insert(&txn)
    .await?;

    let target_rows = targets.iter().map(|startup_id| claim_token_target::ActiveModel {
        claim_token_id: Set(row.id.clone()),
        startup_id: Set(startup_id.to_string()),
    });
    claim_token_target::Entity::insert_many(target_rows)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    info!(
        claim_token_id = %row.id,
        startups = targets.len(),
        expires_at = row.expires_at,
        "Issued claim token"
    );

    Ok(token)
}

async fn unique_token<C, G>(db: &C, generate: &mut G) -> Result<String, ClaimError>
where
    C: ConnectionTrait,
    G: FnMut() -> String,
{
    for attempt in 1..=MAX_TOKEN_ATTEMPTS {
        let candidate = generate();
        let existing = claim_token::Entity::find()
            .filter(claim_token::Column::Token.eq(&candidate))
            .one(db)
            .await?;

        if existing.is_none() {
            return Ok(candidate);
        }
        debug!(attempt, "Claim token collision, retrying");
    }

    error!(
        attempts = MAX_TOKEN_ATTEMPTS,
        "Claim token generation exhausted; check the random source"
    );
    Err(ClaimError::TokenGeneration {
        attempts: MAX_TOKEN_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use watercooler_test_utils::{approved_startup, memory_db};

    use super::*;
    use crate::logging::line_subscriber;

    #[tokio::test]
    async fn gives_up_after_bounded_collisions() {
        let db = memory_db().await;
        approved_startup(&db, "s1", "founder@x.com").await;

        let ids = vec!["s1".to_string()];
        issue_with_generator(&db, || "fixed".to_string(), "founder@x.com", &ids, 24, 1_000)
            .await
            .unwrap();

        let mut calls = 0;
        let err = issue_with_generator(
            &db,
            || {
                calls += 1;
                "fixed".to_string()
            },
            "founder@x.com",
            &ids,
            24,
            1_000,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ClaimError::TokenGeneration {
                attempts: MAX_TOKEN_ATTEMPTS
            }
        ));
        assert_eq!(calls, MAX_TOKEN_ATTEMPTS);
        assert_eq!(claim_token::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn retries_past_a_collision() {
        let db = memory_db().await;
        approved_startup(&db, "s1", "founder@x.com").await;
        let ids = vec!["s1".to_string()];

        issue_with_generator(&db, || "taken".to_string(), "founder@x.com", &ids, 24, 1_000)
            .await
            .unwrap();

        let mut candidates = vec!["fresh".to_string(), "taken".to_string()];
        let token = issue_with_generator(
            &db,
            || candidates.pop().unwrap(),
            "founder@x.com",
            &ids,
            24,
            1_000,
        )
        .await
        .unwrap();

        assert_eq!(token, "fresh");
    }

    #[tokio::test]
    async fn exhaustion_is_logged_as_an_error() {
        let db = memory_db().await;
        approved_startup(&db, "s1", "founder@x.com").await;
        let ids = vec!["s1".to_string()];
        issue_with_generator(&db, || "fixed".to_string(), "founder@x.com", &ids, 24, 1_000)
            .await
            .unwrap();

        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = lines.clone();
        let _guard = tracing::subscriber::set_default(line_subscriber(None, move |line: &str| {
            sink.lock().unwrap().push(line.to_string())
        }));

        issue_with_generator(&db, || "fixed".to_string(), "founder@x.com", &ids, 24, 1_000)
            .await
            .unwrap_err();

        let lines = lines.lock().unwrap();
        assert!(lines
            .iter()
            .any(|l| l.starts_with("ERROR ") && l.contains("Claim token generation exhausted")));
    }
}
