pub use sea_orm_migration::prelude::*;

mod m20261019_000001_users_and_startups;
mod m20261019_000002_claim_tokens;
mod m20261019_000003_rate_limits;

pub struct Migrator;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_users_and_startups::Migration),
            Box::new(m20261019_000002_claim_tokens::Migration),
            Box::new(m20261019_000003_rate_limits::Migration),
        ]
    }
}
