//! Arrival-ordered result set, deduplicated by link.
//!
//! The first result seen for a link owns it: several sites often mirror the
//! same release under one external link, and whichever site answers first
//! keeps the attribution.

use std::collections::HashSet;

use crate::types::SearchResult;

/// Aggregated results of one generation.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    results: Vec<SearchResult>,
    links: HashSet<String>,
}

impl ResultSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `incoming` in order, skipping links already present
    /// (including duplicates within `incoming` itself).
    ///
    /// Returns the results that were actually appended.
    pub fn extend_unique(&mut self, incoming: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut appended = Vec::new();
        for result in incoming {
            if self.links.insert(result.link.clone()) {
                appended.push(result.clone());
                self.results.push(result);
            }
        }
        appended
    }

    /// Results in arrival order.
    pub fn as_slice(&self) -> &[SearchResult] {
        &self.results
    }

    /// Number of unique results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` if nothing has been aggregated yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.results.clear();
        self.links.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(link: &str, site: &str) -> SearchResult {
        SearchResult {
            title: format!("Title from {site}"),
            link: link.to_string(),
            site: site.to_string(),
        }
    }

    #[test]
    fn empty_set() {
        let set = ResultSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn first_seen_link_wins() {
        let mut set = ResultSet::new();
        set.extend_unique(vec![make_result("https://l1", "Vega")]);
        let appended = set.extend_unique(vec![
            make_result("https://l1", "Bolly4u"),
            make_result("https://l2", "Bolly4u"),
        ]);

        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].link, "https://l2");
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].site, "Vega");
    }

    #[test]
    fn duplicates_within_one_batch_collapse() {
        let mut set = ResultSet::new();
        let appended = set.extend_unique(vec![
            make_result("https://l1", "Vega"),
            make_result("https://l1", "Vega"),
        ]);
        assert_eq!(appended.len(), 1);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn preserves_arrival_order() {
        let mut set = ResultSet::new();
        set.extend_unique(vec![make_result("https://c", "A")]);
        set.extend_unique(vec![make_result("https://a", "B"), make_result("https://b", "B")]);
        let links: Vec<&str> = set.as_slice().iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://c", "https://a", "https://b"]);
    }

    #[test]
    fn links_are_compared_exactly() {
        let mut set = ResultSet::new();
        set.extend_unique(vec![make_result("https://l1/", "A")]);
        set.extend_unique(vec![make_result("https://l1", "B")]);
        let links: Vec<&str> = set.as_slice().iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://l1/", "https://l1"]);
    }

    #[test]
    fn clear_resets_dedup_memory() {
        let mut set = ResultSet::new();
        set.extend_unique(vec![make_result("https://l1", "A")]);
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.extend_unique(vec![make_result("https://l1", "B")]).len(), 1);
    }
}
