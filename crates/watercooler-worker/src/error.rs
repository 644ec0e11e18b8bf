use sea_orm::DbErr;
use thiserror::Error;

/// Message returned for every rejected claim link, whatever the cause.
pub const INVALID_OR_EXPIRED_MESSAGE: &str =
    "Invalid or expired token. Please request a new claim link.";

/// Errors from the claim flow.
///
/// Rejections of a presented token are deliberately collapsed into
/// [`ClaimError::InvalidOrExpired`] so callers cannot learn which tokens exist
/// or which listings are already owned.
#[derive(Error, Debug)]
pub enum ClaimError {
    /// Malformed or missing request input.
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown, expired, already used, or targeting an owned listing.
    #[error("{}", INVALID_OR_EXPIRED_MESSAGE)]
    InvalidOrExpired,

    #[error("{0}")]
    NotFound(String),

    /// The random source kept producing tokens that already exist.
    #[error("failed to generate a unique claim token after {attempts} attempts")]
    TokenGeneration { attempts: u32 },

    #[error("too many requests, retry in {retry_after} seconds")]
    RateLimited { retry_after: i64 },

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl ClaimError {
    pub fn status(&self) -> u16 {
        match self {
            ClaimError::InvalidInput(_) => 400,
            ClaimError::InvalidOrExpired | ClaimError::NotFound(_) => 404,
            ClaimError::RateLimited { .. } => 429,
            ClaimError::TokenGeneration { .. } | ClaimError::Db(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ClaimError::InvalidInput(_) => "invalid_input",
            ClaimError::InvalidOrExpired => "invalid_or_expired",
            ClaimError::NotFound(_) => "not_found",
            ClaimError::RateLimited { .. } => "rate_limited",
            ClaimError::TokenGeneration { .. } | ClaimError::Db(_) => "internal_error",
        }
    }

    /// Message safe to show to the caller. Internal failures never leak detail.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            return "Internal server error".to_string();
        }
        self.to_string()
    }

    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }
}
