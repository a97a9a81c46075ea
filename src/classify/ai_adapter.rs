//! Classifier backends: the OpenAI chat-completions provider plus a canned
//! mock for tests and local runs. Backends only move text; prompt building and
//! verdict handling live in `classify::mod`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_COMPLETION_TOKENS: u32 = 400;

/// One batch request, already rendered to text.
#[derive(Debug, Clone)]
pub struct ClassifyRequest<'a> {
    pub model: &'a str,
    pub api_key: &'a str,
    pub system: &'a str,
    pub user: String,
}

#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Whether a call can be attempted at all. Checked once per invocation.
    fn available(&self) -> bool;
    /// Raw message content of the model's reply.
    async fn complete(&self, req: &ClassifyRequest<'_>) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// OpenAI Chat Completions with `response_format = json_object`.
pub struct OpenAiBackend {
    http: Option<reqwest::Client>,
    endpoint: String,
}

impl OpenAiBackend {
    pub fn new() -> Self {
        Self::with_endpoint(OPENAI_CHAT_URL)
    }

    /// Point at a compatible endpoint (proxy, local gateway).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("rfp-monitor/1.0")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| tracing::warn!(error = ?e, "classifier http client unavailable"))
            .ok();
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OpenAiBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}
#[derive(Serialize)]
struct ChatReq<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    max_completion_tokens: u32,
    response_format: ResponseFormat,
}
#[derive(Deserialize)]
struct ChatResp {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait]
impl ClassifierBackend for OpenAiBackend {
    fn available(&self) -> bool {
        cfg!(feature = "llm") && self.http.is_some()
    }

    async fn complete(&self, req: &ClassifyRequest<'_>) -> Result<String> {
        let http = self
            .http
            .as_ref()
            .ok_or_else(|| anyhow!("openai backend has no http client"))?;

        let body = ChatReq {
            model: req.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: req.system,
                },
                Msg {
                    role: "user",
                    content: &req.user,
                },
            ],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = http
            .post(&self.endpoint)
            .bearer_auth(req.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request")?
            .error_for_status()
            .context("openai non-2xx")?;
        let parsed: ChatResp = resp.json().await.context("openai response body")?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_else(|| "{}".to_string()))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Returns a fixed reply (or error) and counts calls.
pub struct MockBackend {
    reply: std::result::Result<String, String>,
    available: bool,
    calls: AtomicUsize,
    last_user: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn replying(content: impl Into<String>) -> Self {
        Self {
            reply: Ok(content.into()),
            available: true,
            calls: AtomicUsize::new(0),
            last_user: Mutex::new(None),
        }
    }

    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            reply: Err(msg.into()),
            ..Self::replying("")
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::replying("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompt of the most recent call.
    pub fn last_user_prompt(&self) -> Option<String> {
        self.last_user.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl ClassifierBackend for MockBackend {
    fn available(&self) -> bool {
        self.available
    }

    async fn complete(&self, req: &ClassifyRequest<'_>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut g) = self.last_user.lock() {
            *g = Some(req.user.clone());
        }
        self.reply.clone().map_err(|e| anyhow!(e))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// Shared handles let tests keep a reference to the mock after handing it over.
#[async_trait]
impl<B: ClassifierBackend + ?Sized> ClassifierBackend for std::sync::Arc<B> {
    fn available(&self) -> bool {
        (**self).available()
    }

    async fn complete(&self, req: &ClassifyRequest<'_>) -> Result<String> {
        (**self).complete(req).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ChatReq {
            model: "gpt-5-nano",
            messages: vec![Msg {
                role: "user",
                content: "hi",
            }],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["response_format"]["type"], "json_object");
        assert_eq!(v["max_completion_tokens"], 400);
        assert_eq!(v["messages"][0]["role"], "user");
    }

    #[test]
    fn null_content_parses() {
        let r: ChatResp =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(r.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn mock_counts_calls_and_fails_on_demand() {
        let m = MockBackend::failing("boom");
        let req = ClassifyRequest {
            model: "m",
            api_key: "k",
            system: "s",
            user: "u".into(),
        };
        assert!(m.complete(&req).await.is_err());
        assert_eq!(m.calls(), 1);
        assert_eq!(m.last_user_prompt().as_deref(), Some("u"));
    }
}
