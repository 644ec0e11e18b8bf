use sea_orm::DatabaseConnection;
use worker::{Env, Request, Response, Result};

use crate::claims::sweep_expired_tokens;
use crate::error::ClaimError;
use crate::rate_limit::sweep_rate_limits;
use crate::util::now_ts;
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::env::load_settings;
use crate::worker_wasm::http::{claim_error_response, internal_error_response, success_response};

use super::admin_auth::ensure_admin_authorized;

pub async fn handle_db_ping(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env).await? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(req, "Failed to open libSQL connection", &e),
    };

    // A minimal query to validate the connection.
    if let Err(e) = db.ping().await {
        return internal_error_response(req, "libSQL ping failed", &e);
    }

    success_response(req, serde_json::json!({ "db": { "ok": true } }))
}

pub async fn handle_claims_sweep(req: &Request, env: &Env) -> Result<Response> {
    if let Some(resp) = ensure_admin_authorized(req, env).await? {
        return Ok(resp);
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(req, "Failed to open libSQL connection", &e),
    };

    match sweep(&db, env).await {
        Ok((tokens, windows)) => success_response(
            req,
            serde_json::json!({
                "deleted": {
                    "claimTokens": tokens,
                    "rateLimits": windows,
                }
            }),
        ),
        Err(e) => claim_error_response(req, "Sweep failed", &e),
    }
}

/// Entry point for the cron trigger.
pub async fn run_sweeps(env: &Env) -> std::result::Result<(), ClaimError> {
    let db = db_connect(env).await?;
    let (tokens, windows) = sweep(&db, env).await?;
    worker::console_log!("Sweep removed {tokens} claim tokens and {windows} rate limit windows");
    Ok(())
}

async fn sweep(db: &DatabaseConnection, env: &Env) -> std::result::Result<(u64, u64), ClaimError> {
    let settings = load_settings(env);
    let now = now_ts();

    let tokens = sweep_expired_tokens(db, now).await?;
    let windows = sweep_rate_limits(db, settings.rate_limit_window_secs, now).await?;
    Ok((tokens, windows))
}
