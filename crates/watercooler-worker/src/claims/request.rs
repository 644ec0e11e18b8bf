use serde::Deserialize;
use serde_json::error::Category;

use super::email::normalize_email;
use crate::error::ClaimError;

/// Body of `POST /api/claim`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimRequest {
    pub email: String,
}

/// Parse a claim request body and return the normalized email.
///
/// Malformed JSON gets a generic message. A well-formed body with the wrong
/// shape gets serde's description, which names the offending field.
pub fn parse_claim_request(body: &str) -> Result<String, ClaimError> {
    let request: ClaimRequest = serde_json::from_str(body).map_err(|e| match e.classify() {
        Category::Data => {
            ClaimError::InvalidInput(format!("Invalid request body: {}", without_position(&e)))
        }
        Category::Io | Category::Syntax | Category::Eof => {
            ClaimError::InvalidInput("Invalid JSON body".to_string())
        }
    })?;

    normalize_email(&request.email)
}

fn without_position(e: &serde_json::Error) -> String {
    let message = e.to_string();
    match message.rsplit_once(" at line ") {
        Some((head, _)) => head.to_string(),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(body: &str) -> String {
        match parse_claim_request(body) {
            Err(ClaimError::InvalidInput(m)) => m,
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn accepts_and_normalizes_email() {
        assert_eq!(
            parse_claim_request(r#"{"email":" Founder@X.com "}"#).unwrap(),
            "founder@x.com"
        );
    }

    #[test]
    fn missing_email_is_named() {
        assert_eq!(message("{}"), "Invalid request body: missing field `email`");
    }

    #[test]
    fn unknown_field_is_named() {
        let m = message(r#"{"email":"a@b.co","startupIds":["x"]}"#);
        assert!(m.starts_with("Invalid request body: unknown field `startupIds`"), "{m}");
    }

    #[test]
    fn wrong_type_is_described() {
        let m = message(r#"{"email":42}"#);
        assert!(m.starts_with("Invalid request body: invalid type: integer `42`"), "{m}");
        assert!(!m.contains(" at line "));
    }

    #[test]
    fn broken_json_is_generic() {
        assert_eq!(message("{\"email\":"), "Invalid JSON body");
        assert_eq!(message("not json"), "Invalid JSON body");
    }

    #[test]
    fn bad_email_uses_the_email_rule() {
        assert_eq!(message(r#"{"email":"nope"}"#), "Valid email is required");
    }
}
