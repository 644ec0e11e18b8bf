use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{TimeZone, Utc};

use getrandom::fill;

/// Random bytes drawn for every claim token.
pub const CLAIM_TOKEN_BYTES: usize = 32;

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

pub fn ts_to_rfc3339(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .unwrap_or_default()
        .to_rfc3339()
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    // Without a working entropy source no token can be trusted; abort the request.
    fill(&mut out).expect("Failed to generate random bytes");
    out
}

/// 256-bit claim token, base64url without padding (43 characters).
pub fn generate_claim_token() -> String {
    URL_SAFE_NO_PAD.encode(random_bytes(CLAIM_TOKEN_BYTES))
}

pub fn uuid_v4() -> String {
    // Format: 8-4-4-4-12 hex characters.
    let mut b = random_bytes(16);

    // Set version = 4.
    b[6] = (b[6] & 0x0f) | 0x40;
    // Set variant = RFC4122.
    b[8] = (b[8] & 0x3f) | 0x80;

    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(36);

    for (i, byte) in b.iter().enumerate() {
        if i == 4 || i == 6 || i == 8 || i == 10 {
            out.push('-');
        }
        out.push(LUT[(byte >> 4) as usize] as char);
        out.push(LUT[(byte & 0x0f) as usize] as char);
    }

    out
}

/// Default display name for a lazily created account: the address' local part.
pub fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Minimal HTML escaping for values interpolated into email bodies.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_token_is_url_safe_and_full_length() {
        let token = generate_claim_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let decoded = URL_SAFE_NO_PAD.decode(token.as_bytes()).unwrap();
        assert_eq!(decoded.len(), CLAIM_TOKEN_BYTES);
    }

    #[test]
    fn claim_tokens_do_not_repeat() {
        let a = generate_claim_token();
        let b = generate_claim_token();
        assert_ne!(a, b);
    }

    #[test]
    fn uuid_has_version_and_dashes() {
        let id = uuid_v4();
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn display_name_is_local_part() {
        assert_eq!(display_name_from_email("founder@x.com"), "founder");
        assert_eq!(display_name_from_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Acme" & Co's</b>"#),
            "&lt;b&gt;&quot;Acme&quot; &amp; Co&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn rfc3339_of_epoch() {
        assert_eq!(ts_to_rfc3339(0), "1970-01-01T00:00:00+00:00");
    }
}
