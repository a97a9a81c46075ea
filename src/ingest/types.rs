// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A link pulled off a source page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String, // absolute
    /// One-line classifier rationale, only set when rationale display is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            reason: None,
        }
    }
}

/// Retrieves the raw HTML for a source page.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}
