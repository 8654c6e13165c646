//! Discovery of currently live site addresses.
//!
//! Two kinds of sources are consulted concurrently:
//!
//! - **Redirect sources**: stable "magic" URLs that redirect to a brand's
//!   current domain. The landing URL is recorded unless it is a parked page.
//! - **Hub sources**: index pages listing working mirrors of many brands.
//!
//! Discovered brand names are canonicalised against the configured brand
//! profiles, which also attach category tags.

mod hub;

use reqwest::StatusCode;

use crate::address::normalize_address;
use crate::backend::SiteDiscovery;
use crate::config::DiscoveryConfig;
use crate::error::SearchError;
use crate::http;
use crate::registry::Registry;
use crate::types::Source;

use hub::{is_parked_page, parse_hub_page};

/// Which configured source a discovery attempt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Redirect,
    Hub,
}

impl SourceKind {
    fn name(self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::Hub => "hub",
        }
    }
}

/// HTTP discovery collaborator over redirect and hub sources.
pub struct HubDiscovery {
    client: reqwest::Client,
    config: DiscoveryConfig,
}

impl HubDiscovery {
    /// Build a discovery client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: DiscoveryConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client(config.timeout_seconds, None)?;
        Ok(Self { client, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Turn a discovered `(address, name)` pair into a source, applying the
    /// matching brand profile if there is one.
    fn canonicalise(&self, address: String, name: &str) -> Source {
        match self.config.brand(name) {
            Some(profile) => Source::new(
                address,
                profile.name.clone(),
                profile.categories.iter().copied(),
            ),
            None => Source::new(address, name.trim(), []),
        }
    }

    async fn fetch(&self, url: &str) -> Result<(String, String), SearchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("{url} request failed: {e}")))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SearchError::Http(format!("{url} returned {status}")));
        }
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("{url} response read failed: {e}")))?;
        Ok((final_url, body))
    }

    /// Follow a magic URL and record where it lands.
    async fn resolve_redirect(&self, magic_url: &str, brand: &str) -> Result<Vec<Source>, SearchError> {
        let (final_url, body) = self.fetch(magic_url).await?;
        if is_parked_page(&body)? {
            tracing::debug!(magic_url, %final_url, "redirect landed on a parked page");
            return Ok(Vec::new());
        }
        let Some(address) = normalize_address(&final_url) else {
            return Err(SearchError::Parse(format!(
                "{magic_url} redirected to unusable address {final_url}"
            )));
        };
        tracing::debug!(magic_url, %address, brand, "redirect resolved");
        Ok(vec![self.canonicalise(address, brand)])
    }

    /// Scrape a hub page for mirror links.
    async fn scrape_hub(&self, hub_url: &str) -> Result<Vec<Source>, SearchError> {
        let (_, body) = self.fetch(hub_url).await?;
        let links = parse_hub_page(&body, hub_url, &self.config.ignored_domains)?;
        Ok(links
            .into_iter()
            .map(|link| self.canonicalise(link.address, &link.brand))
            .collect())
    }
}

impl SiteDiscovery for HubDiscovery {
    async fn discover(&self) -> Result<Registry, SearchError> {
        let redirects = self
            .config
            .redirect_sources
            .iter()
            .map(|(magic_url, brand)| async move {
                (
                    SourceKind::Redirect,
                    magic_url.as_str(),
                    self.resolve_redirect(magic_url, brand).await,
                )
            });
        let hubs = self.config.hub_sources.iter().map(|hub_url| async move {
            (SourceKind::Hub, hub_url.as_str(), self.scrape_hub(hub_url).await)
        });

        let (redirect_outcomes, hub_outcomes) = futures::future::join(
            futures::future::join_all(redirects),
            futures::future::join_all(hubs),
        )
        .await;

        let mut found: Vec<Source> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        for (kind, url, outcome) in redirect_outcomes.into_iter().chain(hub_outcomes) {
            match outcome {
                Ok(sources) => {
                    tracing::debug!(kind = kind.name(), url, count = sources.len(), "discovery source answered");
                    found.extend(sources);
                }
                Err(err) => {
                    tracing::warn!(kind = kind.name(), url, error = %err, "discovery source failed");
                    errors.push(format!("{url}: {err}"));
                }
            }
        }

        let attempted = self.config.redirect_sources.len() + self.config.hub_sources.len();
        if errors.len() == attempted {
            return Err(SearchError::Sync(format!(
                "all discovery sources failed: {}",
                errors.join("; ")
            )));
        }

        let registry: Registry = found.into_iter().collect();
        tracing::info!(
            sources = registry.len(),
            failed = errors.len(),
            attempted,
            "discovery complete"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn discovery() -> HubDiscovery {
        HubDiscovery::new(DiscoveryConfig::default()).expect("valid config")
    }

    #[test]
    fn known_brand_is_canonicalised_with_categories() {
        let source = discovery().canonicalise("https://vegamovies.kg/".into(), "VEGAMOVIES");
        assert_eq!(source.name, "VegaMovies");
        assert!(source.categories.contains(&Category::Anime));
    }

    #[test]
    fn unknown_brand_keeps_name_without_categories() {
        let source = discovery().canonicalise("https://newsite.pizza/".into(), "NEWSITE");
        assert_eq!(source.name, "NEWSITE");
        assert!(source.categories.is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = DiscoveryConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(HubDiscovery::new(config), Err(SearchError::Config(_))));
    }
}
