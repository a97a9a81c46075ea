// src/ingest/extract.rs
use scraper::{Html, Selector};
use url::Url;

use super::types::Candidate;

/// Every `<a href>` on the page as an absolute `(title, url)` pair, in document order.
///
/// No filtering happens here: `mailto:`, fragments and navigation links all come
/// through and are dropped later by the candidate filter. Anchors with no text
/// use the resolved URL as their title.
pub fn extract_links(html: &str, base_url: &str) -> Vec<Candidate> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(error = %e, base_url, "cannot resolve links against invalid base url");
            return Vec::new();
        }
    };
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&link_selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let url = base.join(href.trim()).ok()?.to_string();
            let text = el
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let title = if text.is_empty() { url.clone() } else { text };
            Some(Candidate::new(title, url))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <a href="/bids/123">RFP   <b>Website</b> Redesign</a>
          <a href="https://other.example/rfp.pdf"></a>
          <a href="mailto:buyer@example.org">Email us</a>
          <a name="no-href">Anchor</a>
        </body></html>
    "#;

    #[test]
    fn resolves_relative_links_and_joins_text() {
        let out = extract_links(PAGE, "https://city.example/procurement/");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].title, "RFP Website Redesign");
        assert_eq!(out[0].url, "https://city.example/bids/123");
    }

    #[test]
    fn empty_anchor_text_falls_back_to_url() {
        let out = extract_links(PAGE, "https://city.example/");
        assert_eq!(out[1].title, "https://other.example/rfp.pdf");
    }

    #[test]
    fn non_web_schemes_pass_through_untouched() {
        let out = extract_links(PAGE, "https://city.example/");
        assert_eq!(out[2].url, "mailto:buyer@example.org");
    }

    #[test]
    fn invalid_base_yields_nothing() {
        assert!(extract_links(PAGE, "not a url").is_empty());
    }
}
