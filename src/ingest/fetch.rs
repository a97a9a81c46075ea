// src/ingest/fetch.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::types::PageFetcher;

pub const USER_AGENT: &str = "rfp-monitor/1.0";
pub const FETCH_TIMEOUT_SECS: u64 = 20;

/// Plain GET of the source page. Non-2xx is an error.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("building page fetch client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} non-2xx"))?;
        resp.text().await.context("reading page body")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Serves canned HTML keyed by URL; unknown URLs behave like a failed fetch.
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no fixture for {url}"))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_serves_known_and_fails_unknown() {
        let f = FixtureFetcher::new().with_page("https://a.example/", "<p>hi</p>");
        assert_eq!(f.fetch_page("https://a.example/").await.unwrap(), "<p>hi</p>");
        assert!(f.fetch_page("https://b.example/").await.is_err());
    }
}
