// src/logging.rs
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::env::{non_empty_var, EnvLookup};

pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// `LOG_LEVEL` (e.g. `debug`), else `RUST_LOG`, else `info`.
pub fn log_filter(env: &(impl EnvLookup + ?Sized)) -> String {
    non_empty_var(env, ENV_LOG_LEVEL)
        .map(|v| v.trim().to_ascii_lowercase())
        .or_else(|| non_empty_var(env, "RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}

/// Install the global fmt subscriber. Safe to call twice; the second call is a no-op.
pub fn init(env: &(impl EnvLookup + ?Sized)) {
    let directive = log_filter(env);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
    tracing::debug!(level = %directive, "logging initialized");
}
