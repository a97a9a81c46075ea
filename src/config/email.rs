// src/config/email.rs
use serde::{Deserialize, Serialize};

use super::env::{non_empty_var, EnvLookup};

fn default_smtp_port() -> u16 {
    587
}

/// `[email]` table. Only `smtp_host` is mandatory once `enabled = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub username_env: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// When set, the password is read from this env var only.
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            username: None,
            username_env: None,
            password: None,
            password_env: None,
            from: None,
            to: None,
        }
    }
}

/// Everything needed to open an SMTP session and address one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// Outcome of resolving the email config against the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailPlan {
    Skip(&'static str),
    Send(EmailSettings),
}

impl EmailConfig {
    pub fn resolve(&self, env: &(impl EnvLookup + ?Sized)) -> EmailPlan {
        if !self.enabled {
            return EmailPlan::Skip("email disabled in config");
        }
        let Some(smtp_host) = non_blank(self.smtp_host.as_deref()) else {
            return EmailPlan::Skip("no smtp_host configured");
        };

        let username = self
            .username_env
            .as_deref()
            .and_then(|var| non_empty_var(env, var))
            .or_else(|| non_blank(self.username.as_deref()));

        let password = match self.password_env.as_deref() {
            Some(var) => non_empty_var(env, var),
            None => non_blank(self.password.as_deref()),
        };
        let Some(password) = password else {
            return EmailPlan::Skip("no SMTP password provided (password_env or password)");
        };
        let Some(username) = username else {
            return EmailPlan::Skip("no SMTP username provided (username_env or username)");
        };
        let Some(to) = non_blank(self.to.as_deref()) else {
            return EmailPlan::Skip("no recipient address configured");
        };
        let from = non_blank(self.from.as_deref()).unwrap_or_else(|| username.clone());

        EmailPlan::Send(EmailSettings {
            smtp_host,
            smtp_port: self.smtp_port,
            username,
            password,
            from,
            to,
        })
    }
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
