//! Search and discovery configuration with sensible defaults.
//!
//! [`SearchConfig`] controls per-site requests and the event channel;
//! [`DiscoveryConfig`] lists where live site addresses are looked up. Both
//! deserialize with per-field defaults so a partial config file is enough.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::registry::Registry;
use crate::types::Category;

/// Configuration for querying sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Per-site HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Anchor texts of this many characters or fewer are ignored when
    /// scanning a results page.
    pub min_title_len: usize,
    /// Capacity of the progress event channel.
    pub event_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 7,
            user_agent: None,
            min_title_len: 3,
            event_capacity: 256,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `event_capacity` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(SearchError::Config(
                "event_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Canonical spelling and category tags for a known brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    /// Brand name as it should be displayed.
    pub name: String,
    /// Category tags attached to every discovered address of the brand.
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Configuration for discovering live site addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Index pages listing working mirror domains.
    pub hub_sources: Vec<String>,
    /// Links on these domains (or their subdomains) are never treated as sites.
    pub ignored_domains: Vec<String>,
    /// "Magic" URLs that redirect to a brand's current domain, mapped to the brand.
    pub redirect_sources: BTreeMap<String, String>,
    /// Known brands, matched case-insensitively against discovered names.
    pub brands: Vec<BrandProfile>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let redirect_sources = [
            ("https://vegamovies.la", "VegaMovies"),
            ("https://hdhub4u.tv", "HDHub4u"),
            ("https://bolly4u.cl", "Bolly4u"),
        ]
        .into_iter()
        .map(|(url, name)| (url.to_string(), name.to_string()))
        .collect();

        let hub_sources = [
            "https://vglist.cv/",
            "https://www.modlist.in/",
            "https://mmodlist.net/",
            "https://hdhub4u.catering/",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let ignored_domains = [
            "t.me",
            "telegram.me",
            "facebook.com",
            "fb.com",
            "whatsapp.com",
            "wa.me",
            "instagram.com",
            "twitter.com",
            "x.com",
            "discord.gg",
            "discord.com",
            "youtube.com",
            "youtu.be",
            "pinterest.com",
            "reddit.com",
            "linkedin.com",
            "google.com",
            "bing.com",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let brands = Registry::defaults()
            .iter()
            .map(|source| BrandProfile {
                name: source.name.clone(),
                categories: source.categories.iter().copied().collect(),
            })
            .collect();

        Self {
            timeout_seconds: 5,
            hub_sources,
            ignored_domains,
            redirect_sources,
            brands,
        }
    }
}

impl DiscoveryConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - at least one redirect or hub source must be configured
    /// - brand names must not be blank
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "discovery timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.redirect_sources.is_empty() && self.hub_sources.is_empty() {
            return Err(SearchError::Config(
                "at least one redirect or hub source must be configured".into(),
            ));
        }
        if self.brands.iter().any(|b| b.name.trim().is_empty()) {
            return Err(SearchError::Config("brand names must not be blank".into()));
        }
        Ok(())
    }

    /// Look up a known brand by case-insensitive name.
    pub fn brand(&self, name: &str) -> Option<&BrandProfile> {
        let wanted = name.trim();
        self.brands
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(wanted))
    }
}
