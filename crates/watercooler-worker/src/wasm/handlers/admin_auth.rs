use subtle::ConstantTimeEq;
use worker::{Env, Request, Response, Result};

use crate::worker_wasm::env::env_secret;
use crate::worker_wasm::http::error_response;

pub fn extract_bearer_token(req: &Request) -> Result<Option<String>> {
    let Some(raw) = req.headers().get("Authorization")? else {
        return Ok(None);
    };

    let raw = raw.trim();
    let Some((scheme, rest)) = raw.split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Ok(None);
    }

    Ok(Some(token.to_string()))
}

/// Shared authorization logic for admin endpoints.
///
/// The bearer token must equal `ADMIN_PASSWORD`. An unset password locks the
/// admin surface entirely.
///
/// Returns `Ok(None)` when authorized; otherwise returns an error response.
pub async fn ensure_admin_authorized(req: &Request, env: &Env) -> Result<Option<Response>> {
    let Some(token) = extract_bearer_token(req)? else {
        return Ok(Some(error_response(
            req,
            401,
            "missing_token",
            "Missing Authorization Bearer token",
        )?));
    };

    let Some(required) = env_secret(env, "ADMIN_PASSWORD") else {
        worker::console_log!("Admin request rejected: ADMIN_PASSWORD is not configured");
        return Ok(Some(error_response(req, 401, "unauthorized", "Unauthorized")?));
    };

    if !bool::from(token.as_bytes().ct_eq(required.as_bytes())) {
        return Ok(Some(error_response(req, 401, "unauthorized", "Unauthorized")?));
    }

    Ok(None)
}
