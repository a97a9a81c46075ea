// src/pipeline.rs
//! One scan cycle: for each source, fetch → extract → filter → dedup → seen diff →
//! classify, accumulating the non-empty results into a [`Report`].
//!
//! Sources run one after another. Nothing in here returns an error: a failed
//! fetch is an empty source, a failed classification is a pass-through.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::classify::SemanticFilter;
use crate::config::Source;
use crate::filter::{dedup_by_url, CandidateFilter};
use crate::ingest::{extract_links, Candidate, PageFetcher};
use crate::report::{Report, ReportEntry};
use crate::seen::SeenStore;

/// One-time metrics registration (so series show up once a recorder exists).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("rfp_candidates_total", "Raw links extracted from source pages.");
        describe_counter!("rfp_filtered_total", "Links dropped by keyword/trade/navigation rules.");
        describe_counter!("rfp_dedup_total", "Duplicate links collapsed within one fetch.");
        describe_counter!("rfp_new_total", "Links not present in the seen-state.");
        describe_counter!("rfp_fetch_errors_total", "Source page fetch failures.");
        describe_counter!("rfp_classifier_skips_total", "Classifier pass-throughs without a call.");
        describe_counter!("rfp_classifier_dropped_total", "Links dropped by the classifier.");
    });
}

pub struct Pipeline<'a> {
    fetcher: &'a dyn PageFetcher,
    filter: &'a CandidateFilter,
    classifier: &'a SemanticFilter,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        filter: &'a CandidateFilter,
        classifier: &'a SemanticFilter,
    ) -> Self {
        Self {
            fetcher,
            filter,
            classifier,
        }
    }

    /// Filtered, de-duplicated candidates of one source. Fetch errors yield `[]`.
    pub async fn candidates(&self, source: &Source) -> Vec<Candidate> {
        tracing::info!(source = %source.name, "checking source");
        let html = match self.fetcher.fetch_page(&source.url).await {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = ?e, url = %source.url, fetcher = self.fetcher.name(), "error fetching source");
                counter!("rfp_fetch_errors_total").increment(1);
                return Vec::new();
            }
        };

        let raw = extract_links(&html, &source.url);
        let raw_len = raw.len();
        let filtered = self.filter.apply(source, raw);
        let filtered_len = filtered.len();
        let unique = dedup_by_url(filtered);

        counter!("rfp_candidates_total").increment(raw_len as u64);
        counter!("rfp_filtered_total").increment((raw_len - filtered_len) as u64);
        counter!("rfp_dedup_total").increment((filtered_len - unique.len()) as u64);

        tracing::info!(
            source = %source.name,
            extracted = raw_len,
            candidates = unique.len(),
            "found candidate links"
        );
        unique
    }

    /// Process one source end to end; `None` when nothing new survives.
    pub async fn run_source(&self, source: &Source, seen: &mut SeenStore) -> Option<ReportEntry> {
        let items = self.candidates(source).await;
        let new_items = seen.diff_new_items(source, &items);
        if new_items.is_empty() {
            return None;
        }
        counter!("rfp_new_total").increment(new_items.len() as u64);

        let kept = self.classifier.filter(new_items).await;
        if kept.is_empty() {
            return None;
        }
        Some(ReportEntry {
            source_name: source.name.clone(),
            items: kept,
        })
    }

    /// Every source in config order. `seen` is updated in place; saving it is the caller's job.
    pub async fn run_once(&self, sources: &[Source], seen: &mut SeenStore) -> Report {
        ensure_metrics_described();

        let mut report = Report::new();
        for source in sources {
            if let Some(entry) = self.run_source(source, seen).await {
                report.push(entry);
            }
        }
        tracing::info!(
            sources = sources.len(),
            with_new_items = report.len(),
            "scan finished"
        );
        report
    }
}
