// src/config/env.rs
//! Layered env overrides: (override var, static config, hard default), resolved as
//! pure functions over an [`EnvLookup`] so tests can hand in a plain map.

use std::collections::HashMap;

const TRUTHY: &[&str] = &["1", "true", "yes", "on"];
const FALSY: &[&str] = &["0", "false", "no", "off"];

/// Read-only view of environment variables.
pub trait EnvLookup {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvLookup for [(&str, &str)] {
    fn get(&self, key: &str) -> Option<String> {
        self.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| (*v).to_string())
    }
}

/// Parse `on/off/true/false/1/0/yes/no` (case-insensitive, trimmed).
/// Anything else is `None`.
pub fn parse_bool_token(raw: &str) -> Option<bool> {
    let t = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&t.as_str()) {
        Some(true)
    } else if FALSY.contains(&t.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Boolean value of `var` if it is set to a recognized token.
pub fn env_flag(env: &(impl EnvLookup + ?Sized), var: &str) -> Option<bool> {
    env.get(var).as_deref().and_then(parse_bool_token)
}

/// Override flag wins when recognized, otherwise the static value.
pub fn resolve_flag(env: &(impl EnvLookup + ?Sized), override_var: &str, configured: bool) -> bool {
    env_flag(env, override_var).unwrap_or(configured)
}

/// First non-empty of: override var, configured value, hard default.
pub fn resolve_string(
    env: &(impl EnvLookup + ?Sized),
    override_var: Option<&str>,
    configured: Option<&str>,
    default: &str,
) -> String {
    override_var
        .and_then(|var| non_empty_var(env, var))
        .or_else(|| {
            configured
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| default.to_string())
}

/// Value of `var`, treating an empty or whitespace-only value as unset.
pub fn non_empty_var(env: &(impl EnvLookup + ?Sized), var: &str) -> Option<String> {
    env.get(var).filter(|v| !v.trim().is_empty())
}
