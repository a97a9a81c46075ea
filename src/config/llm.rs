// src/config/llm.rs
use serde::{Deserialize, Serialize};

use super::env::{non_empty_var, resolve_flag, resolve_string, EnvLookup};

pub const DEFAULT_ENABLED_ENV: &str = "LLM_ENABLED";
pub const DEFAULT_MODEL_ENV: &str = "LLM_MODEL";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

fn default_enabled_env() -> String {
    DEFAULT_ENABLED_ENV.to_string()
}
fn default_model_env() -> String {
    DEFAULT_MODEL_ENV.to_string()
}
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// `[llm]` table of the sources config. Everything is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Env var that can force the classifier on/off.
    #[serde(default = "default_enabled_env")]
    pub enabled_env: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Env var whose non-empty value replaces `model`.
    #[serde(default = "default_model_env")]
    pub model_env: String,
    /// Name of the env var holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Attach the model's one-line reason to each kept item.
    #[serde(default)]
    pub rationale: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            enabled_env: default_enabled_env(),
            model: None,
            model_env: default_model_env(),
            api_key_env: default_api_key_env(),
            rationale: false,
        }
    }
}

/// Effective classifier settings after env overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub enabled: bool,
    pub model: String,
    pub api_key: Option<String>,
    /// Only kept for diagnostics ("no key in OPENAI_API_KEY").
    pub api_key_env: String,
    pub rationale: bool,
}

impl LlmSettings {
    pub fn resolve(cfg: &LlmConfig, env: &(impl EnvLookup + ?Sized)) -> Self {
        Self {
            enabled: resolve_flag(env, &cfg.enabled_env, cfg.enabled),
            model: resolve_string(env, Some(&cfg.model_env), cfg.model.as_deref(), DEFAULT_MODEL),
            api_key: non_empty_var(env, &cfg.api_key_env),
            api_key_env: cfg.api_key_env.clone(),
            rationale: cfg.rationale,
        }
    }

    /// Settings that never call out; handy for tests and dry runs.
    pub fn disabled() -> Self {
        let no_env: &[(&str, &str)] = &[];
        Self::resolve(&LlmConfig::default(), no_env)
    }
}
