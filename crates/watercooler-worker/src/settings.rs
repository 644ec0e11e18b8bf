use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_EMAIL_FROM: &str = "Watercooler <onboarding@resend.dev>";
pub const DEFAULT_CLAIM_TTL_HOURS: i64 = 24;
pub const DEFAULT_RATE_LIMIT_MAX: i32 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: i64 = 60 * 60;
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 3;
const MAX_DB_TIMEOUT_SECS: u64 = 30;

/// Deployment settings for the claim flow.
///
/// Secrets (database credentials, email API key, admin password) are not part
/// of this struct; they are read at the call sites that need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the public site, without a trailing slash.
    pub site_url: String,
    pub email_from: String,
    pub claim_ttl_hours: i64,
    pub rate_limit_max: i32,
    pub rate_limit_window_secs: i64,
    /// Connect and acquire timeout for the libSQL pool.
    pub db_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            claim_ttl_hours: DEFAULT_CLAIM_TTL_HOURS,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            db_timeout_secs: DEFAULT_DB_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Build settings from a variable lookup (Worker `Env`, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(normalize_env_value).filter(|v| !v.is_empty());

        Self {
            site_url: get("SITE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            email_from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            claim_ttl_hours: parse_or(
                "CLAIM_TOKEN_TTL_HOURS",
                get("CLAIM_TOKEN_TTL_HOURS"),
                DEFAULT_CLAIM_TTL_HOURS,
                |v| *v >= 0,
            ),
            rate_limit_max: parse_or(
                "CLAIM_RATE_LIMIT_MAX",
                get("CLAIM_RATE_LIMIT_MAX"),
                DEFAULT_RATE_LIMIT_MAX,
                |v| *v > 0,
            ),
            rate_limit_window_secs: parse_or(
                "CLAIM_RATE_LIMIT_WINDOW_SECS",
                get("CLAIM_RATE_LIMIT_WINDOW_SECS"),
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
                |v| *v > 0,
            ),
            db_timeout_secs: parse_or(
                "DB_TIMEOUT_SECS",
                get("DB_TIMEOUT_SECS"),
                DEFAULT_DB_TIMEOUT_SECS,
                |v| (1..=MAX_DB_TIMEOUT_SECS).contains(v),
            ),
        }
    }

    /// Link embedded in the claim email.
    pub fn claim_verify_url(&self, token: &str) -> String {
        format!("{}/claim/verify?token={token}", self.site_url)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.parse::<T>() {
        Ok(v) if valid(&v) => v,
        Ok(v) => {
            warn!("{key}={v} is out of range, using default: {default}");
            default
        }
        Err(e) => {
            warn!("Invalid {key} value ({e}), using default: {default}");
            default
        }
    }
}

/// Strip surrounding whitespace and one layer of matching quotes.
pub fn normalize_env_value(raw: String) -> String {
    let trimmed = raw.trim();

    if let Some(inner) = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return inner.trim().to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(settings_from(&[]), Settings::default());
    }

    #[test]
    fn reads_and_normalizes_values() {
        let s = settings_from(&[
            ("SITE_URL", " \"https://watercooler.example/\" "),
            ("EMAIL_FROM", "'Watercooler <hi@watercooler.example>'"),
            ("CLAIM_TOKEN_TTL_HOURS", "48"),
            ("CLAIM_RATE_LIMIT_MAX", "3"),
            ("CLAIM_RATE_LIMIT_WINDOW_SECS", "600"),
            ("DB_TIMEOUT_SECS", "5"),
        ]);

        assert_eq!(s.site_url, "https://watercooler.example");
        assert_eq!(s.email_from, "Watercooler <hi@watercooler.example>");
        assert_eq!(s.claim_ttl_hours, 48);
        assert_eq!(s.rate_limit_max, 3);
        assert_eq!(s.rate_limit_window_secs, 600);
        assert_eq!(s.db_timeout_secs, 5);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let s = settings_from(&[
            ("CLAIM_TOKEN_TTL_HOURS", "a day"),
            ("CLAIM_RATE_LIMIT_MAX", "0"),
            ("CLAIM_RATE_LIMIT_WINDOW_SECS", "-5"),
        ]);

        assert_eq!(s.claim_ttl_hours, DEFAULT_CLAIM_TTL_HOURS);
        assert_eq!(s.rate_limit_max, DEFAULT_RATE_LIMIT_MAX);
        assert_eq!(s.rate_limit_window_secs, DEFAULT_RATE_LIMIT_WINDOW_SECS);
    }

    #[test]
    fn db_timeout_is_bounded() {
        for raw in ["0", "31", "soon"] {
            let s = settings_from(&[("DB_TIMEOUT_SECS", raw)]);
            assert_eq!(s.db_timeout_secs, DEFAULT_DB_TIMEOUT_SECS, "{raw}");
        }
        assert_eq!(settings_from(&[("DB_TIMEOUT_SECS", "30")]).db_timeout_secs, 30);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let s = settings_from(&[("SITE_URL", "  ")]);
        assert_eq!(s.site_url, DEFAULT_SITE_URL);
    }

    #[test]
    fn builds_verify_link() {
        let s = settings_from(&[("SITE_URL", "https://wc.example")]);
        assert_eq!(
            s.claim_verify_url("abc_123-XYZ"),
            "https://wc.example/claim/verify?token=abc_123-XYZ"
        );
    }
}
