// src/ingest/mod.rs
//! Page retrieval and raw link extraction. Everything here is I/O glue; the
//! decisions happen in `filter`, `seen` and `classify`.

pub mod extract;
pub mod fetch;
pub mod types;

pub use extract::extract_links;
pub use fetch::{FixtureFetcher, HttpFetcher};
pub use types::{Candidate, PageFetcher};

use once_cell::sync::OnceCell;
use regex::Regex;

/// Collapse whitespace runs to one space, trim, lowercase.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re_ws.replace_all(s.trim(), " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_and_lowercases() {
        assert_eq!(normalize_text("  Hello   WORLD  "), "hello world");
    }

    #[test]
    fn normalize_text_folds_tabs_newlines_and_nbsp() {
        assert_eq!(normalize_text("A\u{00A0}\n\tB   C"), "a b c");
        assert_eq!(normalize_text(""), "");
    }
}
