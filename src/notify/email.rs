use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::time::Duration;

use crate::config::EmailSettings;

/// STARTTLS SMTP sender for the plain-text run report.
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    pub fn new(s: &EmailSettings) -> Result<Self> {
        let creds = Credentials::new(s.username.clone(), s.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&s.smtp_host)
            .with_context(|| format!("invalid smtp_host {}", s.smtp_host))?
            .port(s.smtp_port)
            .credentials(creds)
            .timeout(Some(Duration::from_secs(30)))
            .build();
        let (from, to) = parse_addresses(s)?;
        Ok(Self { mailer, from, to })
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }

    pub async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let msg = build_message(&self.from, &self.to, subject, body)?;
        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}

fn parse_addresses(s: &EmailSettings) -> Result<(Mailbox, Mailbox)> {
    let from = s
        .from
        .parse()
        .with_context(|| format!("invalid from address {}", s.from))?;
    let to = s
        .to
        .parse()
        .with_context(|| format!("invalid to address {}", s.to))?;
    Ok((from, to))
}

fn build_message(from: &Mailbox, to: &Mailbox, subject: &str, body: &str) -> Result<Message> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .header(header::ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .context("build email")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(from: &str) -> EmailSettings {
        EmailSettings {
            smtp_host: "smtp.example.org".into(),
            smtp_port: 587,
            username: "bot@example.org".into(),
            password: "pw".into(),
            from: from.into(),
            to: "team@example.org".into(),
        }
    }

    #[test]
    fn message_carries_subject_and_body() {
        let (from, to) = parse_addresses(&settings("bot@example.org")).unwrap();
        let msg = build_message(&from, &to, "New RFPs / Calls for Proposals", "hello").unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("Subject: New RFPs / Calls for Proposals"));
        assert!(raw.contains("To: team@example.org"));
        assert!(raw.contains("hello"));
    }

    #[test]
    fn bad_from_address_is_an_error() {
        assert!(parse_addresses(&settings("not an address")).is_err());
    }
}
