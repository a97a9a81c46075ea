// src/filter.rs
//! Candidate filter + within-fetch dedup.
//!
//! Pure functions of their inputs. The denylists are plain data handed in at
//! construction so a deployment can replace them without touching code.

use std::collections::HashSet;
use url::Url;

use crate::config::{FilterConfig, Source};
use crate::ingest::{normalize_text, Candidate};

/// Physical trades / goods. Matched as substrings of the normalized title.
pub const DEFAULT_TRADE_DENYLIST: &[&str] = &[
    "asphalt",
    "paving",
    "plow",
    "snow removal",
    "hvac",
    "plumbing",
    "flooring",
    "roof",
    "roofing",
    "janitorial",
    "cleaning",
    "welding",
    "fleet",
    "truck",
    "bus",
    "vehicle",
    "tree removal",
    "landscaping",
    "fencing",
    "doors",
    "windows",
    "supplies",
    "parts",
    "hardware",
    "concrete",
    "demolition",
    "construction",
    "road",
    "pavement",
];

/// Portal chrome that is never an opportunity. Matched against the lowercase URL.
pub const DEFAULT_NAVIGATION_DENYLIST: &[&str] = &[
    "/login",
    "/create",
    "/vendor/",
    "/français",
    "/fran%c3%a7ais",
    "bidsandtenders.ca/#",
    "javascript:",
    "/home/bidshomepage",
    "/contact-",
    "/privacy",
    "/terms",
    "/supplier",
    "/buyer",
    "/plans",
    "/demo",
    "/subscribe",
];

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Why a candidate was dropped. Only used for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidUrl,
    Scheme(String),
    NoHost,
    Fragment,
    NoIncludeMatch,
    Excluded(String),
    TradeTerm(String),
    Navigation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    pub trade_denylist: Vec<String>,
    pub navigation_denylist: Vec<String>,
    pub skip_navigation: bool,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            trade_denylist: lowered(DEFAULT_TRADE_DENYLIST.iter().copied()),
            navigation_denylist: lowered(DEFAULT_NAVIGATION_DENYLIST.iter().copied()),
            skip_navigation: true,
        }
    }
}

impl FilterRules {
    /// Built-in lists, replaced wholesale by any list present in `[filter]`.
    pub fn from_config(cfg: &FilterConfig) -> Self {
        let base = Self::default();
        Self {
            trade_denylist: cfg
                .trade_denylist
                .as_ref()
                .map(|v| lowered(v.iter().map(String::as_str)))
                .unwrap_or(base.trade_denylist),
            navigation_denylist: cfg
                .navigation_denylist
                .as_ref()
                .map(|v| lowered(v.iter().map(String::as_str)))
                .unwrap_or(base.navigation_denylist),
            skip_navigation: cfg.skip_navigation,
        }
    }
}

fn lowered<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    rules: FilterRules,
}

impl CandidateFilter {
    pub fn new(rules: FilterRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FilterRules {
        &self.rules
    }

    /// Keep the candidates that pass every rule for `source`, in input order.
    pub fn apply(&self, source: &Source, raw: Vec<Candidate>) -> Vec<Candidate> {
        let include = lowered(source.include_keywords.iter().map(String::as_str));
        let exclude = lowered(source.exclude_keywords.iter().map(String::as_str));

        raw.into_iter()
            .filter(|c| match self.check(c, &include, &exclude) {
                Ok(()) => true,
                Err(why) => {
                    tracing::trace!(source = %source.name, url = %c.url, reason = ?why, "candidate dropped");
                    false
                }
            })
            .collect()
    }

    /// `include`/`exclude` must already be lowercased.
    pub fn check(
        &self,
        c: &Candidate,
        include: &[String],
        exclude: &[String],
    ) -> Result<(), Rejection> {
        let parsed = Url::parse(&c.url).map_err(|_| Rejection::InvalidUrl)?;
        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(Rejection::Scheme(parsed.scheme().to_string()));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(Rejection::NoHost);
        }
        if parsed.fragment().is_some() || c.url.ends_with('#') {
            return Err(Rejection::Fragment);
        }

        let haystack = normalize_text(&format!("{} {}", c.title, c.url));
        if !include.is_empty() && !include.iter().any(|k| haystack.contains(k.as_str())) {
            return Err(Rejection::NoIncludeMatch);
        }
        if let Some(hit) = exclude.iter().find(|k| haystack.contains(k.as_str())) {
            return Err(Rejection::Excluded(hit.clone()));
        }
        if let Some(term) = self.trade_term(&c.title) {
            return Err(Rejection::TradeTerm(term.to_string()));
        }
        if self.rules.skip_navigation {
            if let Some(pat) = self.navigation_pattern(&c.url) {
                return Err(Rejection::Navigation(pat.to_string()));
            }
        }
        Ok(())
    }

    /// First trade-denylist term contained in the normalized title.
    pub fn trade_term(&self, title: &str) -> Option<&str> {
        let hay = normalize_text(title);
        self.rules
            .trade_denylist
            .iter()
            .find(|w| hay.contains(w.as_str()))
            .map(String::as_str)
    }

    fn navigation_pattern(&self, url: &str) -> Option<&str> {
        let lower = url.to_lowercase();
        self.rules
            .navigation_denylist
            .iter()
            .find(|p| lower.contains(p.as_str()))
            .map(String::as_str)
    }
}

/// First occurrence of each URL wins; order is preserved.
pub fn dedup_by_url(items: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen_urls: HashSet<String> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|c| seen_urls.insert(c.url.clone()))
        .collect()
}
