//! libSQL connection for a single Worker invocation.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use worker::Env;

use super::env::{env_secret, load_settings};
use crate::error::ClaimError;

/// Open the claim database named by `LIBSQL_URL`.
///
/// The pool lives only as long as the request. Claim issuance, redemption and
/// the rate limiter each run as one transaction on its single connection.
pub async fn db_connect(env: &Env) -> Result<DatabaseConnection, ClaimError> {
    let url = env_secret(env, "LIBSQL_URL").ok_or_else(|| {
        ClaimError::Db(DbErr::Custom("LIBSQL_URL is not configured".to_string()))
    })?;
    let timeout = Duration::from_secs(load_settings(env).db_timeout_secs);

    let mut options = ConnectOptions::new(url);
    if let Some(token) = env_secret(env, "LIBSQL_AUTH_TOKEN") {
        options.libsql_auth_token(token);
    }
    options
        .max_connections(1)
        .min_connections(0)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Ok(Database::connect(options).await?)
}
