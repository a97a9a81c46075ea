// src/lib.rs
//! rfp-monitor: scan procurement pages for RFP/RFI links, keep the relevant new
//! ones, and report them.
//!
//! The binary is a thin wrapper around [`run_cycle`]; integration tests drive the
//! same function with fixture pages and a mock classifier.

pub mod classify;
pub mod config;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod seen;

use std::path::Path;

pub use crate::config::{AppConfig, Source};
pub use crate::ingest::Candidate;
pub use crate::pipeline::Pipeline;
pub use crate::report::{format_report, Report, ReportEntry};
pub use crate::seen::SeenStore;

use crate::classify::{ClassifierBackend, SemanticFilter};
use crate::config::{EnvLookup, LlmSettings};
use crate::filter::{CandidateFilter, FilterRules};
use crate::ingest::PageFetcher;

/// What one cycle produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: Report,
    pub text: String,
    pub emailed: bool,
}

/// One full scan → filter → report → email cycle.
///
/// `force_refresh` deletes the seen-state before loading it. The seen-state is
/// written back once, after all sources ran; a failed save is logged only.
pub async fn run_cycle(
    cfg: &AppConfig,
    seen_path: &Path,
    force_refresh: bool,
    fetcher: &dyn PageFetcher,
    backend: impl ClassifierBackend + 'static,
    env: &(impl EnvLookup + ?Sized),
) -> RunOutcome {
    if force_refresh {
        tracing::info!("force refresh enabled: ignoring seen cache");
        if let Err(e) = SeenStore::reset(seen_path) {
            tracing::warn!(error = ?e, "could not remove seen cache");
        }
    }
    let mut seen = SeenStore::load(seen_path);

    let filter = CandidateFilter::new(FilterRules::from_config(&cfg.filter));
    let classifier = SemanticFilter::new(LlmSettings::resolve(&cfg.llm, env), backend);
    let report = Pipeline::new(fetcher, &filter, &classifier)
        .run_once(&cfg.sources, &mut seen)
        .await;

    if let Err(e) = seen.save(seen_path) {
        tracing::error!(error = ?e, path = %seen_path.display(), "failed to save seen-state");
    }

    let text = format_report(&report);
    tracing::info!("\n{text}");

    let emailed = if report.is_empty() {
        false
    } else {
        notify::email_report(&cfg.email, env, &text).await
    };

    RunOutcome {
        report,
        text,
        emailed,
    }
}
