use serde::{Deserialize, Serialize};
use worker::{Env, Headers, Method, Request, RequestInit, Result};

use crate::mail::EmailMessage;
use crate::worker_wasm::env::env_secret;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct ResendSendEmailBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendSendEmailResponse {
    id: Option<String>,
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

pub fn resend_is_configured(env: &Env) -> bool {
    env_secret(env, "RESEND_API_KEY").is_some()
}

/// Send `message` through Resend. Returns the provider's message id when given.
pub async fn send_email(env: &Env, from: &str, message: &EmailMessage) -> Result<Option<String>> {
    let Some(api_key) = env_secret(env, "RESEND_API_KEY") else {
        return Err(worker::Error::RustError("RESEND_API_KEY is required".to_string()));
    };

    let body = ResendSendEmailBody {
        from,
        to: vec![message.to.as_str()],
        subject: &message.subject,
        html: &message.html,
        text: &message.text,
    };

    let json = serde_json::to_string(&body)
        .map_err(|e| worker::Error::RustError(format!("Failed to serialize Resend payload: {e}")))?;

    let headers = Headers::new();
    headers.set("Authorization", &format!("Bearer {api_key}"))?;
    headers.set("Content-Type", "application/json")?;
    headers.set("Accept", "application/json")?;
    headers.set("User-Agent", "Watercooler/0.1 (Cloudflare Worker)")?;

    let mut init = RequestInit::new();
    init.with_method(Method::Post);
    init.with_headers(headers);
    init.with_body(Some(json.into()));

    let req = Request::new_with_init(RESEND_ENDPOINT, &init)?;

    let mut resp = worker::Fetch::Request(req).send().await?;
    let status = resp.status_code();
    let body = resp.text().await.unwrap_or_default();
    if is_success_status(status) {
        let id = serde_json::from_str::<ResendSendEmailResponse>(&body)
            .ok()
            .and_then(|r| r.id);
        return Ok(id);
    }

    Err(worker::Error::RustError(format!(
        "Resend send failed (status={status}): {body}"
    )))
}
