use crate::error::ClaimError;

const MAX_EMAIL_LEN: usize = 254;

/// Trim, lower-case and shape-check an email address.
pub fn normalize_email(raw: &str) -> Result<String, ClaimError> {
    let email = raw.trim().to_lowercase();
    let invalid = || ClaimError::InvalidInput("Valid email is required".to_string());

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(
            normalize_email("  Founder@Example.COM ").unwrap(),
            "founder@example.com"
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "   ",
            "founder",
            "@example.com",
            "founder@",
            "founder@example",
            "founder@.com",
            "founder@example.",
            "a@b@example.com",
            "found er@example.com",
        ] {
            assert!(
                matches!(normalize_email(bad), Err(ClaimError::InvalidInput(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overlong_addresses() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(normalize_email(&long).is_err());
    }
}
