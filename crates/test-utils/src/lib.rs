//! Shared fixtures for the claim service tests.
//!
//! - [`memory_db`] - migrated in-memory SQLite database
//! - [`insert_startup`], [`approved_startup`], [`insert_user`], [`set_owner`] - seed rows
//! - [`startup_by_id`], [`token_row`] - read rows back

#![allow(clippy::expect_used)]

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

use entity::{claim_token, startup, user};

/// Fixed "current time" for tests, in Unix seconds.
pub const NOW: i64 = 1_760_000_000;
pub const HOUR: i64 = 60 * 60;

/// Fresh in-memory SQLite database with every migration applied.
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // One connection, otherwise each pooled connection gets its own database.
    options.max_connections(1);
    options.min_connections(1);
    options.sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Seed a listing named `Startup {id}` with slug `startup-{id}`.
pub async fn insert_startup(db: &DatabaseConnection, id: &str, founder_email: &str, status: &str) {
    startup::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Startup {id}")),
        slug: Set(format!("startup-{id}")),
        founder_email: Set(founder_email.to_string()),
        status: Set(status.to_string()),
        owner_id: Set(None),
        owned_at: Set(None),
        created_at: Set(NOW - 10 * HOUR),
        updated_at: Set(NOW - 10 * HOUR),
    }
    .insert(db)
    .await
    .expect("insert startup");
}

pub async fn approved_startup(db: &DatabaseConnection, id: &str, founder_email: &str) {
    insert_startup(db, id, founder_email, startup::STATUS_APPROVED).await;
}

pub async fn insert_user(db: &DatabaseConnection, id: &str, email: &str) -> user::Model {
    user::ActiveModel {
        id: Set(id.to_string()),
        email: Set(email.to_string()),
        name: Set(Some("Existing".to_string())),
        created_at: Set(NOW - HOUR),
        updated_at: Set(NOW - HOUR),
    }
    .insert(db)
    .await
    .expect("insert user")
}

/// Mark a startup as owned outside the claim flow.
pub async fn set_owner(db: &DatabaseConnection, startup_id: &str, owner_id: &str) {
    let row = startup_by_id(db, startup_id).await;
    let mut active: startup::ActiveModel = row.into();
    active.owner_id = Set(Some(owner_id.to_string()));
    active.owned_at = Set(Some(NOW));
    active.update(db).await.expect("set owner");
}

pub async fn startup_by_id(db: &DatabaseConnection, id: &str) -> startup::Model {
    startup::Entity::find_by_id(id.to_string())
        .one(db)
        .await
        .expect("query startup")
        .expect("startup exists")
}

pub async fn token_row(db: &DatabaseConnection, token: &str) -> claim_token::Model {
    claim_token::Entity::find()
        .filter(claim_token::Column::Token.eq(token))
        .one(db)
        .await
        .expect("query token")
        .expect("token exists")
}

pub fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_startup_uses_the_shared_naming() {
        let db = memory_db().await;
        approved_startup(&db, "e1", "founder@x.com").await;

        let row = startup_by_id(&db, "e1").await;
        assert_eq!(row.name, "Startup e1");
        assert_eq!(row.slug, "startup-e1");
        assert_eq!(row.status, startup::STATUS_APPROVED);
        assert!(!row.is_owned());
    }
}
