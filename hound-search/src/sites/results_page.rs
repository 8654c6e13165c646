//! Extraction of result links from a site's search results page.
//!
//! Most indexed sites run WordPress themes, so post titles sit in headings
//! with a `title`/`entry`/`post` class. Themes that don't follow that
//! convention fall back to a greedy scan over every anchor on the page.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::SearchError;
use crate::types::SearchResult;

/// Heading classes that mark a post title.
const TITLE_CLASS_HINTS: &[&str] = &["title", "entry", "post"];

/// Marker of a link back into the site's own search.
const SEARCH_PAGE_MARKER: &str = "/?s=";

/// Parse a results page into search results.
///
/// Runs the heading pass first and only falls back to the greedy anchor pass
/// when it yields nothing. Links are resolved against `base`; a link seen
/// twice on the same page is kept once.
///
/// Extracted as a separate function for testability with mock HTML.
pub(crate) fn parse_results_page(
    html: &str,
    query: &str,
    base: &Url,
    site: &str,
    min_title_len: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);
    let needle = query.trim().to_lowercase();

    let mut results = heading_pass(&document, &needle, base, site)?;
    if results.is_empty() {
        tracing::trace!(site, "no titled headings matched; scanning all anchors");
        results = greedy_pass(&document, &needle, base, site, min_title_len)?;
    }

    tracing::debug!(site, count = results.len(), "results page parsed");
    Ok(results)
}

fn heading_pass(
    document: &Html,
    needle: &str,
    base: &Url,
    site: &str,
) -> Result<Vec<SearchResult>, SearchError> {
    let heading_sel = Selector::parse("h1[class], h2[class], h3[class], h4[class]")
        .map_err(|e| SearchError::Parse(format!("invalid heading selector: {e:?}")))?;
    let anchor_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid anchor selector: {e:?}")))?;

    let mut collector = Collector::new(site);
    for heading in document.select(&heading_sel) {
        let class = heading.value().attr("class").unwrap_or_default();
        if !TITLE_CLASS_HINTS.iter().any(|hint| class.contains(hint)) {
            continue;
        }
        let Some(anchor) = heading.select(&anchor_sel).next() else {
            continue;
        };
        let title = anchor_text(&anchor);
        if !title.to_lowercase().contains(needle) {
            continue;
        }
        let Some(link) = anchor.value().attr("href").and_then(|h| resolve(base, h)) else {
            continue;
        };
        collector.push(title, link);
    }
    Ok(collector.finish())
}

fn greedy_pass(
    document: &Html,
    needle: &str,
    base: &Url,
    site: &str,
    min_title_len: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let anchor_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid anchor selector: {e:?}")))?;

    let mut collector = Collector::new(site);
    for anchor in document.select(&anchor_sel) {
        let title = anchor_text(&anchor);
        if title.chars().count() <= min_title_len || !title.to_lowercase().contains(needle) {
            continue;
        }
        let Some(link) = anchor.value().attr("href").and_then(|h| resolve(base, h)) else {
            continue;
        };
        if link.contains(SEARCH_PAGE_MARKER) {
            continue;
        }
        collector.push(title, link);
    }
    Ok(collector.finish())
}

fn anchor_text(anchor: &ElementRef<'_>) -> String {
    anchor
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve `href` against `base`, keeping only http(s) targets.
fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Accumulates results for one page, dropping repeated links.
struct Collector<'a> {
    site: &'a str,
    seen: HashSet<String>,
    results: Vec<SearchResult>,
}

impl<'a> Collector<'a> {
    fn new(site: &'a str) -> Self {
        Self {
            site,
            seen: HashSet::new(),
            results: Vec::new(),
        }
    }

    fn push(&mut self, title: String, link: String) {
        if self.seen.insert(link.clone()) {
            self.results.push(SearchResult {
                title,
                link,
                site: self.site.to_string(),
            });
        }
    }

    fn finish(self) -> Vec<SearchResult> {
        self.results
    }
}
