//! Claim-link lifecycle.
//!
//! A founder asks for a claim link, receives a single-use token by email and
//! redeems it to take ownership of their approved listings:
//!
//! ```text
//! ISSUED --redeem--> USED
//! ISSUED --time----> EXPIRED
//! ```
//!
//! Both end states are terminal. Every rejection of a presented token surfaces
//! as [`ClaimError::InvalidOrExpired`](crate::error::ClaimError::InvalidOrExpired).

mod apply;
mod email;
mod issue;
mod request;
mod sweep;
mod verify;

use sea_orm::{ConnectionTrait, TransactionTrait};

pub use apply::{apply, ClaimOutcome};
pub use email::normalize_email;
pub use issue::{claimable_startups, issue, MAX_TOKEN_ATTEMPTS};
pub use request::{parse_claim_request, ClaimRequest};
pub use sweep::sweep_expired_tokens;
pub use verify::{verify, VerifiedClaim};

use crate::error::ClaimError;

/// Verify `token` and apply the claim in one call.
///
/// The verification read and the conditional writes in [`apply`] together
/// guarantee that concurrent redemptions of one token have a single winner.
pub async fn redeem<C>(db: &C, token: &str, now: i64) -> Result<ClaimOutcome, ClaimError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let verified = verify(db, token, now).await?;
    apply(db, &verified, now).await
}
