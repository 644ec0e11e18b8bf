use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use entity::{claim_token, claim_token_target, startup};

use crate::error::ClaimError;

/// A token that passed every validity check at the time it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaim {
    pub token: claim_token::Model,
    /// Target listings, ordered by name.
    pub startups: Vec<startup::Model>,
}

impl VerifiedClaim {
    pub fn email(&self) -> &str {
        &self.token.email
    }

    pub fn startup_ids(&self) -> Vec<String> {
        self.startups.iter().map(|s| s.id.clone()).collect()
    }
}

/// Check a presented token without consuming it.
///
/// Read-only, so safe to call repeatedly. Every failure collapses into
/// [`ClaimError::InvalidOrExpired`]; the specific reason is only logged.
pub async fn verify<C>(db: &C, token: &str, now: i64) -> Result<VerifiedClaim, ClaimError>
where
    C: ConnectionTrait,
{
    let token = token.trim();
    if token.is_empty() {
        return Err(ClaimError::InvalidInput("Token is required".to_string()));
    }

    let Some(row) = claim_token::Entity::find()
        .filter(claim_token::Column::Token.eq(token))
        .one(db)
        .await?
    else {
        debug!("Claim token rejected: unknown");
        return Err(ClaimError::InvalidOrExpired);
    };

    if row.is_expired_at(now) {
        debug!(claim_token_id = %row.id, "Claim token rejected: expired");
        return Err(ClaimError::InvalidOrExpired);
    }
    if row.is_used() {
        debug!(claim_token_id = %row.id, "Claim token rejected: already used");
        return Err(ClaimError::InvalidOrExpired);
    }

    let target_ids: Vec<String> = claim_token_target::Entity::find()
        .filter(claim_token_target::Column::ClaimTokenId.eq(&row.id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.startup_id)
        .collect();

    let startups = startup::Entity::find()
        .filter(startup::Column::Id.is_in(target_ids.clone()))
        .order_by_asc(startup::Column::Name)
        .all(db)
        .await?;

    // A listing deleted since issuance leaves the token pointing at nothing.
    let expected = usize::try_from(row.target_count).unwrap_or_default();
    if expected == 0 || target_ids.len() != expected || startups.len() != expected {
        debug!(claim_token_id = %row.id, "Claim token rejected: missing targets");
        return Err(ClaimError::InvalidOrExpired);
    }
    if startups.iter().any(startup::Model::is_owned) {
        debug!(claim_token_id = %row.id, "Claim token rejected: target already owned");
        return Err(ClaimError::InvalidOrExpired);
    }

    Ok(VerifiedClaim {
        token: row,
        startups,
    })
}
