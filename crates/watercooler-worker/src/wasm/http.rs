use std::fmt::Display;

use serde_json::Value;
use worker::{Headers, Request, Response, Result};

use crate::error::ClaimError;

fn cors_headers(req: &Request) -> Result<Headers> {
    let headers = Headers::new();

    // Reflect Origin when present; otherwise allow all.
    let origin = req.headers().get("Origin")?.unwrap_or_else(|| "*".to_string());

    headers.set("Access-Control-Allow-Origin", &origin)?;
    headers.set("Vary", "Origin")?;
    headers.set("Access-Control-Allow-Credentials", "true")?;
    headers.set("Access-Control-Allow-Methods", "GET,POST,OPTIONS")?;
    headers.set(
        "Access-Control-Allow-Headers",
        "Authorization,Content-Type,Accept",
    )?;

    Ok(headers)
}

pub fn json_with_cors(req: &Request, mut resp: Response) -> Result<Response> {
    let headers = cors_headers(req)?;
    let resp_headers = resp.headers_mut();
    for (k, v) in headers.entries() {
        resp_headers.set(&k, &v)?;
    }

    Ok(resp)
}

/// `{ "success": true, ...data }`.
pub fn success_response(req: &Request, data: Value) -> Result<Response> {
    let mut body = serde_json::json!({ "success": true });
    if let (Some(out), Value::Object(fields)) = (body.as_object_mut(), data) {
        out.extend(fields);
    }

    let resp = Response::from_json(&body)?;
    json_with_cors(req, resp)
}

pub fn error_response(req: &Request, status: u16, code: &str, message: &str) -> Result<Response> {
    let body = serde_json::json!({
        "success": false,
        "error": {
            "code": code,
            "message": message
        }
    });

    let resp = Response::from_json(&body)?.with_status(status);
    json_with_cors(req, resp)
}

pub fn internal_error_response<E: Display>(req: &Request, context: &str, err: &E) -> Result<Response> {
    worker::console_log!("{context}: {err}");
    error_response(req, 500, "internal_error", "Internal server error")
}

/// Convert a claim-flow failure into the JSON error envelope.
pub fn claim_error_response(req: &Request, context: &str, err: &ClaimError) -> Result<Response> {
    if err.is_internal() {
        return internal_error_response(req, context, err);
    }

    let mut resp = error_response(req, err.status(), err.code(), &err.public_message())?;
    if let ClaimError::RateLimited { retry_after } = err {
        resp.headers_mut().set("Retry-After", &retry_after.to_string())?;
    }
    Ok(resp)
}

pub fn not_found(req: &Request) -> Result<Response> {
    error_response(req, 404, "not_found", "Not found")
}
