//! HTTP query collaborator for WordPress-style movie sites.
//!
//! Every indexed site exposes the standard `/?s=` search endpoint; the
//! returned page is scraped with [`results_page`].

mod results_page;

use reqwest::header::{HeaderMap, REFERER, SERVER};
use reqwest::StatusCode;
use url::Url;

use crate::backend::SiteQuery;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::outcome::QueryResponse;

use results_page::parse_results_page;

/// Markers of a Cloudflare browser challenge page.
const CHALLENGE_MARKERS: &[&str] = &[
    "cf-browser-verification",
    "challenge-platform",
    "Just a moment...",
    "cf_chl_opt",
];

/// Queries a site's own search page and scrapes the results.
///
/// One client (and cookie jar) is shared by every query this instance runs.
pub struct SiteSearchClient {
    client: reqwest::Client,
    min_title_len: usize,
}

impl SiteSearchClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(config.timeout_seconds, config.user_agent.as_deref())?;
        Ok(Self {
            client,
            min_title_len: config.min_title_len,
        })
    }
}

/// Build the search page URL: `{base without trailing slash}/?s={words joined by '+'}`.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if `address` is not an absolute URL.
pub fn search_url(address: &str, text: &str) -> Result<Url, SearchError> {
    let encoded: String = url::form_urlencoded::byte_serialize(text.trim().as_bytes()).collect();
    let raw = format!("{}/?s={encoded}", address.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| SearchError::Http(format!("invalid site address {address}: {e}")))
}

/// Whether a non-200 response is a bot-protection refusal.
fn is_blocked(status: StatusCode, headers: &HeaderMap, body: &str) -> bool {
    if status == StatusCode::FORBIDDEN {
        return true;
    }
    if status != StatusCode::SERVICE_UNAVAILABLE {
        return false;
    }
    let served_by_cloudflare = headers
        .get(SERVER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("cloudflare"));
    served_by_cloudflare
        || headers.contains_key("cf-mitigated")
        || CHALLENGE_MARKERS.iter().any(|marker| body.contains(marker))
}

impl SiteQuery for SiteSearchClient {
    async fn query(
        &self,
        text: &str,
        address: &str,
        brand: &str,
    ) -> Result<QueryResponse, SearchError> {
        let url = search_url(address, text)?;
        tracing::trace!(query = text, site = brand, "site search");

        let response = self
            .client
            .get(url.clone())
            .header(REFERER, address)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("{brand} request failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("{brand} response read failed: {e}")))?;

        if status == StatusCode::OK {
            tracing::trace!(site = brand, bytes = body.len(), "results page received");
            let base = Url::parse(address)
                .map_err(|e| SearchError::Http(format!("invalid site address {address}: {e}")))?;
            let results = parse_results_page(&body, text, &base, brand, self.min_title_len)?;
            return Ok(QueryResponse::ok(results));
        }

        if is_blocked(status, &headers, &body) {
            tracing::debug!(site = brand, status = status.as_u16(), "site blocked the request");
            return Ok(QueryResponse::blocked());
        }

        tracing::debug!(site = brand, status = status.as_u16(), "unexpected HTTP status");
        Ok(QueryResponse::error(format!("http-{}", status.as_u16())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn search_url_joins_words_with_plus() {
        let url = search_url("https://moviesmod.town/", "the dark knight").expect("url");
        assert_eq!(url.as_str(), "https://moviesmod.town/?s=the+dark+knight");
    }

    #[test]
    fn search_url_encodes_reserved_characters() {
        let url = search_url("https://moviesmod.town", "fast & furious").expect("url");
        assert_eq!(url.as_str(), "https://moviesmod.town/?s=fast+%26+furious");
    }

    #[test]
    fn search_url_rejects_garbage_address() {
        assert!(search_url("not a url", "batman").is_err());
    }

    #[test]
    fn forbidden_is_blocked() {
        assert!(is_blocked(StatusCode::FORBIDDEN, &HeaderMap::new(), ""));
    }

    #[test]
    fn plain_503_is_not_blocked() {
        assert!(!is_blocked(
            StatusCode::SERVICE_UNAVAILABLE,
            &HeaderMap::new(),
            "maintenance"
        ));
    }

    #[test]
    fn cloudflare_503_is_blocked() {
        let mut headers = HeaderMap::new();
        headers.insert(SERVER, HeaderValue::from_static("cloudflare"));
        assert!(is_blocked(StatusCode::SERVICE_UNAVAILABLE, &headers, ""));
        assert!(is_blocked(
            StatusCode::SERVICE_UNAVAILABLE,
            &HeaderMap::new(),
            "<title>Just a moment...</title>"
        ));
    }

    #[test]
    fn other_errors_are_not_blocked() {
        assert!(!is_blocked(StatusCode::NOT_FOUND, &HeaderMap::new(), ""));
    }

    #[test]
    fn client_rejects_invalid_config() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            SiteSearchClient::new(&config),
            Err(SearchError::Config(_))
        ));
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SiteSearchClient>();
    }
}
