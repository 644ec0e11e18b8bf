use worker::Env;

use crate::settings::{normalize_env_value, Settings};

pub fn env_string(env: &Env, key: &str) -> Option<String> {
    env.var(key)
        .ok()
        .map(|v| normalize_env_value(v.to_string()))
        .filter(|s| !s.is_empty())
}

/// Secrets are bound separately from plain vars in Wrangler; check both.
pub fn env_secret(env: &Env, key: &str) -> Option<String> {
    env.secret(key)
        .ok()
        .map(|v| normalize_env_value(v.to_string()))
        .filter(|s| !s.is_empty())
        .or_else(|| env_string(env, key))
}

pub fn load_settings(env: &Env) -> Settings {
    Settings::from_lookup(|key| env_string(env, key))
}
