//! Core types: sources, categories and search results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Content category a source can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Hollywood and other international releases.
    International,
    /// Bollywood and regional Indian releases.
    Indian,
    /// Anime series and films.
    Anime,
    /// Korean dramas and films.
    Korean,
}

impl Category {
    /// Returns the lowercase identifier used in config files and on the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::International => "international",
            Self::Indian => "indian",
            Self::Anime => "anime",
            Self::Korean => "korean",
        }
    }

    /// Returns all category variants.
    pub fn all() -> &'static [Category] {
        &[Self::International, Self::Indian, Self::Anime, Self::Korean]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| SearchError::Config(format!("unknown category `{s}`")))
    }
}

/// Category filter applied when selecting the active sources of a query.
///
/// `All` is reserved and matches every source. `Only(c)` matches sources
/// tagged with `c`; untagged sources never match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// Every source is active.
    #[default]
    All,
    /// Only sources tagged with this category are active.
    Only(Category),
}

impl CategoryFilter {
    /// Returns `true` if a source with `categories` is active under this filter.
    pub fn matches(&self, categories: &BTreeSet<Category>) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => categories.contains(category),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// One content index reachable at a base address.
///
/// The address is the registry key; the brand name is the identity used
/// when merging registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Base address, e.g. `https://moviesmod.town/`.
    pub address: String,
    /// Display brand, e.g. `MoviesMod`.
    pub name: String,
    /// Category tags.
    pub categories: BTreeSet<Category>,
}

impl Source {
    /// Create a source from its parts.
    pub fn new(
        address: impl Into<String>,
        name: impl Into<String>,
        categories: impl IntoIterator<Item = Category>,
    ) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            categories: categories.into_iter().collect(),
        }
    }

    /// Case-insensitive brand identity used for merging.
    pub fn brand_key(&self) -> String {
        brand_key(&self.name)
    }

    /// Returns `true` if this source is active under `filter`.
    pub fn matches(&self, filter: &CategoryFilter) -> bool {
        filter.matches(&self.categories)
    }
}

/// Normalise a brand name into its merge identity.
pub fn brand_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A single search hit reported by a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title text of the result link.
    pub title: String,
    /// Absolute link; the identity used for deduplication.
    pub link: String,
    /// Brand name of the site that reported this result.
    pub site: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display_and_parse() {
        for category in Category::all() {
            let parsed: Category = category.to_string().parse().expect("parse");
            assert_eq!(parsed, *category);
        }
        assert_eq!("Anime".parse::<Category>().expect("parse"), Category::Anime);
    }

    #[test]
    fn unknown_category_rejected() {
        let err = "documentary".parse::<Category>().unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn filter_parse_all_is_reserved() {
        assert_eq!("all".parse::<CategoryFilter>().expect("parse"), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().expect("parse"), CategoryFilter::All);
        assert_eq!(
            "korean".parse::<CategoryFilter>().expect("parse"),
            CategoryFilter::Only(Category::Korean)
        );
    }

    #[test]
    fn anime_source_filtering() {
        let source = Source::new("https://anime.example/", "AnimeHub", [Category::Anime]);
        assert!(source.matches(&CategoryFilter::All));
        assert!(source.matches(&CategoryFilter::Only(Category::Anime)));
        assert!(!source.matches(&CategoryFilter::Only(Category::Indian)));
    }

    #[test]
    fn untagged_source_only_matches_all() {
        let source = Source::new("https://plain.example/", "Plain", []);
        assert!(source.matches(&CategoryFilter::All));
        for category in Category::all() {
            assert!(!source.matches(&CategoryFilter::Only(*category)));
        }
    }

    #[test]
    fn brand_key_is_case_insensitive() {
        let a = Source::new("https://a.example/", "VegaMovies", []);
        let b = Source::new("https://b.example/", " VEGAMOVIES ", []);
        assert_eq!(a.brand_key(), b.brand_key());
    }

    #[test]
    fn category_serde_uses_lowercase() {
        let json = serde_json::to_string(&Category::International).expect("serialize");
        assert_eq!(json, "\"international\"");
        let decoded: Category = serde_json::from_str("\"korean\"").expect("deserialize");
        assert_eq!(decoded, Category::Korean);
    }
}
