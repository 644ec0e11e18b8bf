pub mod user;
pub mod startup;
pub mod claim_token;
pub mod claim_token_target;
pub mod rate_limit;

pub use user::Entity as User;
pub use startup::Entity as Startup;
pub use claim_token::Entity as ClaimToken;
pub use claim_token_target::Entity as ClaimTokenTarget;
pub use rate_limit::Entity as RateLimit;
