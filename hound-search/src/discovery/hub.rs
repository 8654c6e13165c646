//! Parsing of hub index pages and redirect landing pages.

use scraper::{Html, Selector};

use crate::address::{bare_host, brand_from_host, normalize_address};
use crate::error::SearchError;

/// Brand labels this short or shorter are discarded as noise.
pub(crate) const MIN_BRAND_LEN: usize = 3;

/// Title words that mark a parked or for-sale domain.
const PARKED_TITLE_WORDS: &[&str] = &["domain", "sale"];

/// A mirror link found on a hub page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HubLink {
    /// Normalised site address.
    pub address: String,
    /// Upper-cased brand guess from the host.
    pub brand: String,
}

/// Extract mirror links from a hub page.
///
/// Keeps absolute http(s) links that are neither on the hub's own domain
/// nor on an ignored domain and whose host yields a usable brand label.
pub(crate) fn parse_hub_page(
    html: &str,
    hub_url: &str,
    ignored_domains: &[String],
) -> Result<Vec<HubLink>, SearchError> {
    let document = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid anchor selector: {e:?}")))?;
    let hub_host = bare_host(hub_url);

    let mut links: Vec<HubLink> = Vec::new();
    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim().to_lowercase();
        if !(href.starts_with("http://") || href.starts_with("https://")) {
            continue;
        }
        let Some(address) = normalize_address(&href) else {
            continue;
        };
        let Some(host) = bare_host(&address) else {
            continue;
        };
        if hub_host.as_deref() == Some(host.as_str()) || is_ignored(&host, ignored_domains) {
            continue;
        }
        let Some(brand) = brand_from_host(&address, MIN_BRAND_LEN) else {
            continue;
        };
        if links.iter().any(|l| l.address == address) {
            continue;
        }
        links.push(HubLink { address, brand });
    }

    tracing::debug!(hub = hub_url, count = links.len(), "hub page parsed");
    Ok(links)
}

/// Whether `host` is, or is a subdomain of, any ignored domain.
pub(crate) fn is_ignored(host: &str, ignored_domains: &[String]) -> bool {
    ignored_domains.iter().any(|domain| {
        let domain = domain.trim().to_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

/// Whether a landing page looks like a parked domain rather than a live site.
pub(crate) fn is_parked_page(html: &str) -> Result<bool, SearchError> {
    let document = Html::parse_document(html);
    let title_sel = Selector::parse("title")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let title = document
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().to_lowercase())
        .unwrap_or_default();
    Ok(PARKED_TITLE_WORDS.iter().any(|word| title.contains(word)))
}
