// src/config/mod.rs
//! Run configuration: monitored sources plus the `[llm]`, `[email]` and `[filter]` tables.
//!
//! Loaded once at startup from TOML. Any problem here is fatal; everything
//! downstream degrades instead of failing.

pub mod email;
pub mod env;
pub mod llm;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use email::{EmailConfig, EmailPlan, EmailSettings};
pub use env::{EnvLookup, ProcessEnv};
pub use llm::{LlmConfig, LlmSettings};

pub const DEFAULT_CONFIG_PATH: &str = "config/sources.toml";
pub const DEFAULT_SEEN_PATH: &str = "seen.json";

pub const ENV_CONFIG_PATH: &str = "RFP_CONFIG_PATH";
pub const ENV_SEEN_PATH: &str = "RFP_SEEN_PATH";

/// One monitored page plus its keyword rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

fn default_skip_navigation() -> bool {
    true
}

/// `[filter]` table: deployment overrides for the built-in denylists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_skip_navigation")]
    pub skip_navigation: bool,
    #[serde(default)]
    pub trade_denylist: Option<Vec<String>>,
    #[serde(default)]
    pub navigation_denylist: Option<Vec<String>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_navigation: default_skip_navigation(),
            trade_denylist: None,
            navigation_denylist: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub sources: Vec<Source>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s).context("parsing sources config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("config must contain a non-empty `sources` list");
        }
        let mut names = HashSet::new();
        for (i, s) in self.sources.iter().enumerate() {
            if s.name.trim().is_empty() {
                bail!("source #{i} has an empty `name`");
            }
            if s.url.trim().is_empty() {
                bail!("source `{}` has an empty `url`", s.name);
            }
            if !names.insert(s.name.as_str()) {
                bail!("duplicate source name `{}`", s.name);
            }
        }
        if self.email.enabled
            && self
                .email
                .smtp_host
                .as_deref()
                .map_or(true, |h| h.trim().is_empty())
        {
            bail!("[email] is enabled but `smtp_host` is missing");
        }
        Ok(())
    }
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        bail!("config file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    AppConfig::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
}

/// `$RFP_CONFIG_PATH`, else `config/sources.toml`.
pub fn config_path(env: &(impl EnvLookup + ?Sized)) -> PathBuf {
    env::non_empty_var(env, ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// `$RFP_SEEN_PATH`, else `seen.json`.
pub fn seen_path(env: &(impl EnvLookup + ?Sized)) -> PathBuf {
    env::non_empty_var(env, ENV_SEEN_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_PATH))
}
