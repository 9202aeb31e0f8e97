//! Discovery of image URLs worth verifying.

use crate::document::Document;
use std::collections::HashSet;
use url::Url;

/// Extensions of formats that may be animated.
const ANIMATED_EXTENSIONS: &[&str] = &[".gif", ".webp", ".apng"];

/// Hosts that serve animated images regardless of extension.
const ANIMATED_HOSTS: &[&str] = &["giphy.com", "tenor.com", "gfycat.com", "imgur.com"];

/// URL fragments that mark a still rendition.
const STILL_MARKERS: &[&str] = &["still", "static", "_s.gif", "poster", "frozen"];

/// A URL to verify, with its cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl {
    /// Lowercased absolute URL used as the cache key.
    pub key: String,
    /// URL to request, case preserved.
    pub url: Url,
}

/// Resolves an `img[src]` value against `base`.
///
/// Only `http` and `https` URLs are returned; fragments are dropped.
#[must_use]
pub fn resolve_resource_url(src: &str, base: Option<&Url>) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    let mut url = match Url::parse(src) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(src).ok()?,
        Err(_) => return None,
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Returns the cache key for an `img[src]` value: the resolved URL,
/// lowercased.
#[must_use]
pub fn normalize_resource_url(src: &str, base: Option<&Url>) -> Option<String> {
    resolve_resource_url(src, base).map(|u| u.as_str().to_lowercase())
}

/// Returns true if `url` looks like it may be animated.
#[must_use]
pub fn is_animation_candidate(url: &Url) -> bool {
    let lowered = url.as_str().to_lowercase();
    if STILL_MARKERS.iter().any(|m| lowered.contains(m)) {
        return false;
    }
    let path = url.path().to_lowercase();
    if ANIMATED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return true;
    }
    url.host_str()
        .map(str::to_lowercase)
        .is_some_and(|host| ANIMATED_HOSTS.iter().any(|h| host.contains(h)))
}

/// Collects candidate image URLs in document order, deduplicated by key.
#[must_use]
pub fn discover(document: &Document) -> Vec<ResourceUrl> {
    let base = document.base_url();
    let mut seen = HashSet::new();
    document
        .elements()
        .filter(|el| el.value().name() == "img")
        .filter_map(|el| el.value().attr("src"))
        .filter_map(|src| resolve_resource_url(src, base))
        .filter(is_animation_candidate)
        .filter_map(|url| {
            let key = url.as_str().to_lowercase();
            seen.insert(key.clone()).then_some(ResourceUrl { key, url })
        })
        .collect()
}
