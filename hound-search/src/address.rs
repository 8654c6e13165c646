//! Site address helpers.
//!
//! Canonicalises site base addresses so that the same site discovered in
//! slightly different spellings (case, default port, missing trailing slash,
//! stray query or fragment) ends up under one registry key, and ranks
//! competing addresses for the same brand.

use std::cmp::Ordering;

use url::Url;

/// Canonicalise a site base address.
///
/// Applies the following transformations:
///
/// 1. Lowercase scheme and host (done by the URL parser).
/// 2. Remove default ports (`:80` for HTTP, `:443` for HTTPS).
/// 3. Remove the query string and fragment.
/// 4. Ensure the path ends with a slash.
///
/// Returns `None` if the input is not an absolute `http`/`https` URL with a host.
///
/// # Examples
///
/// ```
/// use hound_search::address::normalize_address;
///
/// let a = normalize_address("HTTPS://MoviesMod.Town:443?ref=hub#top");
/// assert_eq!(a.as_deref(), Some("https://moviesmod.town/"));
/// ```
pub fn normalize_address(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }

    parsed.set_fragment(None);
    parsed.set_query(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    let path = parsed.path().to_string();
    if !path.ends_with('/') {
        parsed.set_path(&format!("{path}/"));
    }

    Some(parsed.to_string())
}

/// Returns `true` if the address uses the secure (`https`) scheme.
pub fn is_secure(address: &str) -> bool {
    address
        .get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// Order two addresses for the same brand; the preferred one sorts first.
///
/// A secure scheme beats an insecure one; on a tie the shorter string wins;
/// a remaining tie is broken lexicographically so the choice is deterministic.
pub fn preference(a: &str, b: &str) -> Ordering {
    is_secure(b)
        .cmp(&is_secure(a))
        .then_with(|| a.len().cmp(&b.len()))
        .then_with(|| a.cmp(b))
}

/// Host of an address with any leading `www.` removed.
pub fn bare_host(address: &str) -> Option<String> {
    let parsed = Url::parse(address.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Derive a brand guess from the first host label, e.g.
/// `https://www.moviesmod.town/` → `MOVIESMOD`.
///
/// Returns `None` for hosts without a dot or labels of `min_len` characters
/// or fewer, which are almost always noise.
pub fn brand_from_host(address: &str, min_len: usize) -> Option<String> {
    let host = bare_host(address)?;
    let (label, _) = host.split_once('.')?;
    if label.chars().count() <= min_len {
        return None;
    }
    Some(label.to_uppercase())
}

/// Returns `true` if the URL uses the default port for its scheme.
fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
