// src/classify/mod.rs
//! Semantic keep/drop pass over a source's new candidates.
//!
//! Never fails closed: disabled, no key, no backend, transport error or an
//! unreadable reply all hand back the input unchanged.

pub mod ai_adapter;
pub mod verdict;

use metrics::counter;
use serde::Serialize;

use crate::config::LlmSettings;
use crate::ingest::Candidate;

pub use ai_adapter::{ClassifierBackend, ClassifyRequest, MockBackend, OpenAiBackend};
pub use verdict::{parse_verdicts, Verdict, VerdictRecord};

pub const SYSTEM_PROMPT: &str = "You triage procurement postings. Keep only opportunities that involve software, web, digital products, data/analytics, platforms, portals, LMS, edtech, or technical consulting. Drop construction, fleet/vehicles, physical supplies, janitorial, roads, HVAC, plumbing, landscaping, hardware-only, or general maintenance.";

/// Why the classifier did not call out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoItems,
    Disabled,
    NoApiKey,
    BackendUnavailable,
}

pub struct SemanticFilter {
    settings: LlmSettings,
    backend: Box<dyn ClassifierBackend>,
}

#[derive(Serialize)]
struct PromptItem<'a> {
    index: usize,
    title: &'a str,
    url: &'a str,
}

impl SemanticFilter {
    pub fn new(settings: LlmSettings, backend: impl ClassifierBackend + 'static) -> Self {
        Self {
            settings,
            backend: Box::new(backend),
        }
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// The first short-circuit that applies, if any.
    pub fn skip_reason(&self, items: &[Candidate]) -> Option<SkipReason> {
        if items.is_empty() {
            Some(SkipReason::NoItems)
        } else if !self.settings.enabled {
            Some(SkipReason::Disabled)
        } else if self.settings.api_key.is_none() {
            Some(SkipReason::NoApiKey)
        } else if !self.backend.available() {
            Some(SkipReason::BackendUnavailable)
        } else {
            None
        }
    }

    pub async fn filter(&self, items: Vec<Candidate>) -> Vec<Candidate> {
        if let Some(why) = self.skip_reason(&items) {
            match why {
                SkipReason::NoItems => tracing::debug!("skipping LLM filter: no items to process"),
                SkipReason::Disabled => {
                    tracing::info!("LLM disabled via config/env; skipping LLM filtering")
                }
                SkipReason::NoApiKey => tracing::info!(
                    env = %self.settings.api_key_env,
                    "no API key found; skipping LLM filtering"
                ),
                SkipReason::BackendUnavailable => tracing::warn!(
                    backend = self.backend.name(),
                    "classifier backend not available; skipping LLM filtering"
                ),
            }
            if why != SkipReason::NoItems {
                counter!("rfp_classifier_skips_total").increment(1);
            }
            return items;
        }
        let api_key = self.settings.api_key.as_deref().unwrap_or_default();

        tracing::info!(
            model = %self.settings.model,
            items = items.len(),
            "running LLM filter"
        );

        let user = match build_user_prompt(&items) {
            Ok(u) => u,
            Err(e) => {
                tracing::error!(error = ?e, "LLM prompt build failed; skipping LLM filtering");
                return items;
            }
        };
        let req = ClassifyRequest {
            model: &self.settings.model,
            api_key,
            system: SYSTEM_PROMPT,
            user,
        };

        let verdicts = match self.backend.complete(&req).await {
            Ok(content) => parse_verdicts(&content, items.len()),
            Err(e) => Err(e),
        };
        match verdicts {
            Ok(v) => {
                let before = items.len();
                let kept = apply_verdicts(items, &v, self.settings.rationale);
                counter!("rfp_classifier_dropped_total").increment((before - kept.len()) as u64);
                kept
            }
            Err(e) => {
                tracing::error!(error = ?e, "LLM filter error; skipping LLM filtering");
                items
            }
        }
    }
}

/// User message: instructions plus the JSON batch `[{index, title, url}, ...]`.
pub fn build_user_prompt(items: &[Candidate]) -> serde_json::Result<String> {
    let batch: Vec<PromptItem<'_>> = items
        .iter()
        .enumerate()
        .map(|(index, c)| PromptItem {
            index,
            title: &c.title,
            url: &c.url,
        })
        .collect();
    Ok(format!(
        "Classify each item as keep (true/false) and give a 1-line reason. \
         Return a JSON object with a 'results' key containing a list like \
         {{\"results\":[{{\"index\":0,\"keep\":true,\"reason\":\"...\"}}]}}.\n\
         Items:\n{}",
        serde_json::to_string(&batch)?
    ))
}

/// Items with a `keep=true` verdict, in submission order. The first verdict per
/// index counts. With `rationale`, a returned reason is attached.
pub fn apply_verdicts(items: Vec<Candidate>, verdicts: &[Verdict], rationale: bool) -> Vec<Candidate> {
    let mut by_index: Vec<Option<&Verdict>> = vec![None; items.len()];
    for v in verdicts {
        if let Some(slot) = by_index.get_mut(v.index) {
            slot.get_or_insert(v);
        }
    }

    items
        .into_iter()
        .zip(by_index)
        .filter_map(|(mut item, v)| {
            let v = v.filter(|v| v.keep)?;
            if rationale {
                if let Some(reason) = &v.reason {
                    item.reason = Some(reason.clone());
                }
            }
            Some(item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn settings(enabled: bool, key: Option<&str>, rationale: bool) -> LlmSettings {
        LlmSettings {
            enabled,
            model: "gpt-5-nano".into(),
            api_key: key.map(str::to_string),
            api_key_env: "OPENAI_API_KEY".into(),
            rationale,
        }
    }

    fn items() -> Vec<Candidate> {
        vec![
            Candidate::new("LMS Platform RFP", "https://a.example/1"),
            Candidate::new("Sidewalk Snow Clearing", "https://a.example/2"),
            Candidate::new("Data Warehouse Consulting", "https://a.example/3"),
        ]
    }

    #[tokio::test]
    async fn empty_input_never_calls_out() {
        let mock = Arc::new(MockBackend::replying("{}"));
        let f = SemanticFilter::new(settings(true, Some("k"), false), mock.clone());
        assert!(f.filter(vec![]).await.is_empty());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn disabled_no_key_or_unavailable_pass_through() {
        let mock = Arc::new(MockBackend::replying(r#"{"results":[]}"#));
        let f = SemanticFilter::new(settings(false, Some("k"), false), mock.clone());
        assert_eq!(f.filter(items()).await, items());

        let f = SemanticFilter::new(settings(true, None, false), mock.clone());
        assert_eq!(f.filter(items()).await, items());
        assert_eq!(mock.calls(), 0);

        let f = SemanticFilter::new(settings(true, Some("k"), false), MockBackend::unavailable());
        assert_eq!(f.skip_reason(&items()), Some(SkipReason::BackendUnavailable));
        assert_eq!(f.filter(items()).await, items());
    }

    #[tokio::test]
    async fn transport_error_fails_open() {
        let f = SemanticFilter::new(settings(true, Some("k"), false), MockBackend::failing("timeout"));
        assert_eq!(f.filter(items()).await, items());
    }

    #[tokio::test]
    async fn malformed_reply_fails_open() {
        let f = SemanticFilter::new(
            settings(true, Some("k"), false),
            MockBackend::replying("I think they are all fine"),
        );
        assert_eq!(f.filter(items()).await, items());
    }

    #[tokio::test]
    async fn keeps_only_true_verdicts_in_submission_order() {
        let reply = r#"{"results":[
            {"index":2,"keep":true,"reason":"data consulting"},
            {"index":1,"keep":false,"reason":"snow clearing"},
            {"index":0,"keep":true,"reason":"LMS"},
            {"index":9,"keep":true}
        ]}"#;
        let mock = Arc::new(MockBackend::replying(reply));
        let f = SemanticFilter::new(settings(true, Some("k"), false), mock.clone());
        let out = f.filter(items()).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].url, "https://a.example/1");
        assert_eq!(out[1].url, "https://a.example/3");
        assert!(out.iter().all(|c| c.reason.is_none()));

        let prompt = mock.last_user_prompt().unwrap();
        assert!(prompt.contains(r#""index":1"#));
        assert!(prompt.contains("Sidewalk Snow Clearing"));
    }

    #[tokio::test]
    async fn rationale_attaches_reasons() {
        let reply = r#"{"results":[{"index":0,"keep":true,"reason":"LMS"},{"index":2,"keep":true}]}"#;
        let f = SemanticFilter::new(settings(true, Some("k"), true), MockBackend::replying(reply));
        let out = f.filter(items()).await;
        assert_eq!(out[0].reason.as_deref(), Some("LMS"));
        assert_eq!(out[1].reason, None);
    }

    #[test]
    fn first_verdict_per_index_wins() {
        let v = vec![
            Verdict {
                index: 0,
                keep: false,
                reason: None,
            },
            Verdict {
                index: 0,
                keep: true,
                reason: None,
            },
        ];
        assert!(apply_verdicts(items(), &v, false).is_empty());
    }
}
