// src/notify/mod.rs
//! Report delivery. Email is the only channel; every failure is logged and swallowed.

pub mod email;

pub use email::EmailSender;

use crate::config::{EmailConfig, EmailPlan, EnvLookup};
use crate::report::EMAIL_SUBJECT;

/// Send `body` per `[email]`. Skips (info) when disabled or incomplete,
/// logs transport errors. Returns whether a message went out.
pub async fn email_report(cfg: &EmailConfig, env: &(impl EnvLookup + ?Sized), body: &str) -> bool {
    let settings = match cfg.resolve(env) {
        EmailPlan::Skip(why) => {
            tracing::info!(reason = why, "skipping email send");
            return false;
        }
        EmailPlan::Send(s) => s,
    };

    let sender = match EmailSender::new(&settings) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = ?e, "email setup failed");
            return false;
        }
    };
    match sender.send(EMAIL_SUBJECT, body).await {
        Ok(()) => {
            tracing::info!(to = %sender.recipient(), "email sent");
            true
        }
        Err(e) => {
            tracing::error!(error = ?e, "error sending email");
            false
        }
    }
}
