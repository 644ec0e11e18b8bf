use worker::{Env, Request, Response, Result};

use crate::claims::{claimable_startups, issue, parse_claim_request, redeem};
use crate::error::ClaimError;
use crate::mail::claim_email;
use crate::rate_limit::{check_rate_limit, client_identifier};
use crate::util::{now_ts, ts_to_rfc3339};
use crate::worker_wasm::db::db_connect;
use crate::worker_wasm::env::load_settings;
use crate::worker_wasm::http::{
    claim_error_response, error_response, internal_error_response, success_response,
};
use crate::worker_wasm::resend::{resend_is_configured, send_email};

/// `POST /api/claim`: email a claim link for the caller's approved listings.
pub async fn handle_claim_request(mut req: Request, env: &Env) -> Result<Response> {
    let body = match req.text().await {
        Ok(body) => body,
        Err(e) => {
            worker::console_log!("Failed to read claim request body: {e}");
            return error_response(&req, 400, "invalid_input", "Invalid JSON body");
        }
    };

    let email = match parse_claim_request(&body) {
        Ok(email) => email,
        Err(e) => return claim_error_response(&req, "Invalid claim request", &e),
    };

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let settings = load_settings(env);
    let now = now_ts();

    let client = client_identifier(|name| req.headers().get(name).ok().flatten());
    let limited = check_rate_limit(
        &db,
        &format!("claim:{client}"),
        settings.rate_limit_max,
        settings.rate_limit_window_secs,
        now,
    )
    .await
    .and_then(|decision| decision.into_result(now));
    if let Err(e) = limited {
        return claim_error_response(&req, "Rate limit check failed", &e);
    }

    let startups = match claimable_startups(&db, &email).await {
        Ok(s) => s,
        Err(e) => return claim_error_response(&req, "Failed to look up startups", &e),
    };
    if startups.is_empty() {
        let e = ClaimError::NotFound("No approved startups found for this email address".to_string());
        return claim_error_response(&req, "No claimable startups", &e);
    }

    let ids: Vec<String> = startups.iter().map(|s| s.id.clone()).collect();
    let token = match issue(&db, &email, &ids, settings.claim_ttl_hours, now).await {
        Ok(t) => t,
        Err(e) => return claim_error_response(&req, "Failed to issue claim token", &e),
    };

    let names: Vec<String> = startups.iter().map(|s| s.name.clone()).collect();
    let message = claim_email(
        &email,
        &settings.site_url,
        &settings.claim_verify_url(&token),
        &names,
        settings.claim_ttl_hours,
    );

    // The token is already stored; a lost email only means the founder asks again.
    if resend_is_configured(env) {
        match send_email(env, &settings.email_from, &message).await {
            Ok(id) => worker::console_log!("Claim email sent (id={})", id.unwrap_or_default()),
            Err(e) => worker::console_log!("Failed to send claim email: {e}"),
        }
    } else {
        worker::console_log!("RESEND_API_KEY not set; claim email not sent");
    }

    let listed: Vec<_> = startups
        .iter()
        .map(|s| serde_json::json!({ "name": s.name, "slug": s.slug }))
        .collect();

    success_response(
        &req,
        serde_json::json!({
            "message": "Claim verification email sent! Please check your inbox.",
            "startups": listed,
        }),
    )
}

/// `GET /api/claim/verify?token=..`: redeem a claim link.
pub async fn handle_claim_verify(req: Request, env: &Env) -> Result<Response> {
    let token = req
        .url()?
        .query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    if token.trim().is_empty() {
        return error_response(&req, 400, "invalid_input", "Token is required");
    }

    let db = match db_connect(env).await {
        Ok(db) => db,
        Err(e) => return internal_error_response(&req, "Failed to open libSQL connection", &e),
    };

    let outcome = match redeem(&db, &token, now_ts()).await {
        Ok(o) => o,
        Err(e) => return claim_error_response(&req, "Failed to verify claim token", &e),
    };

    let claimed: Vec<_> = outcome
        .startups
        .iter()
        .map(|s| {
            serde_json::json!({
                "id": s.id,
                "name": s.name,
                "slug": s.slug,
                "claimedAt": s.owned_at.map(ts_to_rfc3339),
            })
        })
        .collect();

    success_response(
        &req,
        serde_json::json!({
            "message": "Startups successfully claimed!",
            "user": {
                "id": outcome.user.id,
                "email": outcome.user.email,
                "name": outcome.user.name,
                "created": outcome.user_created,
            },
            "startups": claimed,
        }),
    )
}
