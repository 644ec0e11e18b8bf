use std::sync::Once;

use worker::*;

#[path = "wasm/db/mod.rs"]
pub mod db;
#[path = "wasm/env.rs"]
pub mod env;
#[path = "wasm/handlers/mod.rs"]
pub mod handlers;
#[path = "wasm/http.rs"]
pub mod http;
#[path = "wasm/resend.rs"]
pub mod resend;

use http::{json_with_cors, not_found};

/// Route core `tracing` events to the Workers console, filtered by `LOG_LEVEL`.
fn init_tracing(env: &Env) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let directive = self::env::env_string(env, "LOG_LEVEL");
        let subscriber =
            crate::logging::line_subscriber(directive.as_deref(), |line| console_log!("{line}"));
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            console_log!("tracing subscriber already installed");
        }
    });
}

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();
    init_tracing(&env);

    if req.method() == Method::Options {
        let resp = Response::empty()?.with_status(204);
        return json_with_cors(&req, resp);
    }

    let url = req.url()?;
    let path = url.path();

    if req.method() == Method::Get && path == "/health" {
        let body = serde_json::json!({
            "ok": true,
            "service": "watercooler",
        });
        let resp = Response::from_json(&body)?;
        return json_with_cors(&req, resp);
    }

    // Claim flow.
    if req.method() == Method::Post && path == "/api/claim" {
        return handlers::claim::handle_claim_request(req, &env).await;
    }
    if req.method() == Method::Get && path == "/api/claim/verify" {
        return handlers::claim::handle_claim_verify(req, &env).await;
    }

    // Admin.
    if req.method() == Method::Post && path == "/v1/admin/migrations/up" {
        return handlers::migrations::handle_migrations_up(&req, &env).await;
    }
    if req.method() == Method::Get && path == "/v1/admin/db/ping" {
        return handlers::admin::handle_db_ping(&req, &env).await;
    }
    if req.method() == Method::Post && path == "/v1/admin/claims/sweep" {
        return handlers::admin::handle_claims_sweep(&req, &env).await;
    }

    not_found(&req)
}

/// Cron trigger: garbage-collect expired claim tokens and closed rate-limit windows.
#[event(scheduled)]
pub async fn scheduled(_event: ScheduledEvent, env: Env, _ctx: ScheduleContext) {
    console_error_panic_hook::set_once();
    init_tracing(&env);

    if let Err(e) = handlers::admin::run_sweeps(&env).await {
        console_log!("Scheduled sweep failed: {e}");
    }
}
