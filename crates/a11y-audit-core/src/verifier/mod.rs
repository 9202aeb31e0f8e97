//! Asynchronous animated-image verification.
//!
//! Verification is a separate phase that must finish before a scan that
//! includes animation-dependent rules:
//!
//! ```text
//! Document
//!   ↓ discover()            (sync: img[src] → candidate URLs)
//! Vec<ResourceUrl>
//!   ↓ verify_urls()         (async: fetch + decode, single-flight per URL)
//! AnimationResults          (only constructible here)
//!   ↓ ScanRequest::animations()
//! Engine::run_scan()
//! ```
//!
//! Any URL that cannot be fetched or decoded in time is recorded as not
//! animated.

mod decode;
mod discovery;
mod fetch;

pub use decode::{is_animated, AnimatableFormat, DecodeError};
pub use discovery::{
    discover, is_animation_candidate, normalize_resource_url, resolve_resource_url, ResourceUrl,
};
pub use fetch::{FetchError, HttpFetcher, ResourceFetcher, MAX_RESOURCE_BYTES};

use crate::document::Document;
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Verified animation state per normalised URL.
///
/// Values are produced only by [`AnimationVerifier`], so holding one proves
/// the pre-scan has completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationResults {
    results: HashMap<String, bool>,
}

impl AnimationResults {
    pub(crate) fn from_map(results: HashMap<String, bool>) -> Self {
        Self { results }
    }

    /// An empty result set for scans where fetching is disabled; every
    /// image is then given the benefit of the doubt.
    #[must_use]
    pub fn unverified() -> Self {
        Self::default()
    }

    /// Returns true if the image at `src` was verified to be animated.
    #[must_use]
    pub fn is_animated(&self, src: &str, base: Option<&Url>) -> bool {
        normalize_resource_url(src, base).is_some_and(|key| self.is_key_animated(&key))
    }

    /// Looks up an already-normalised key (lowercased before lookup).
    #[must_use]
    pub fn is_key_animated(&self, key: &str) -> bool {
        self.results
            .get(&key.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Number of verified URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no URL was verified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// URLs verified as animated, sorted.
    #[must_use]
    pub fn animated_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self
            .results
            .iter()
            .filter(|(_, animated)| **animated)
            .map(|(url, _)| url.as_str())
            .collect();
        urls.sort_unstable();
        urls
    }
}

/// Fetches and decodes candidate images, caching one result per URL.
///
/// Concurrent pre-scans that share URLs await the same in-flight fetch.
pub struct AnimationVerifier<F = HttpFetcher> {
    fetcher: F,
    cache: Mutex<HashMap<String, Arc<OnceCell<bool>>>>,
}

impl AnimationVerifier<HttpFetcher> {
    /// Creates a verifier backed by [`HttpFetcher`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self::with_fetcher(HttpFetcher::new()?))
    }
}

impl<F: ResourceFetcher> AnimationVerifier<F> {
    /// Creates a verifier with a custom fetcher.
    #[must_use]
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Discovers candidate images in `document` and verifies each, bounding
    /// every fetch by `timeout`.
    ///
    /// Discovery runs before the returned future is first polled, so the
    /// future does not borrow the document.
    pub fn pre_scan(
        &self,
        document: &Document,
        timeout: Duration,
    ) -> impl Future<Output = AnimationResults> + Send + '_ {
        let urls = discover(document);
        tracing::debug!(candidates = urls.len(), "animated-image pre-scan");
        self.verify_urls(urls, timeout)
    }

    /// Verifies a precomputed list of URLs.
    pub async fn verify_urls(&self, urls: Vec<ResourceUrl>, timeout: Duration) -> AnimationResults {
        let checks = urls.into_iter().map(|resource| async move {
            let animated = self.verify_one(&resource, timeout).await;
            (resource.key, animated)
        });
        AnimationResults::from_map(join_all(checks).await.into_iter().collect())
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        self.lock_cache().clear();
    }

    /// Number of cached URLs, including in-flight ones.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.lock_cache().len()
    }

    async fn verify_one(&self, resource: &ResourceUrl, timeout: Duration) -> bool {
        let cell = Arc::clone(self.lock_cache().entry(resource.key.clone()).or_default());
        *cell
            .get_or_init(|| self.fetch_and_decode(&resource.url, timeout))
            .await
    }

    async fn fetch_and_decode(&self, url: &Url, timeout: Duration) -> bool {
        let url = url.as_str();
        match tokio::time::timeout(timeout, self.fetcher.fetch(url)).await {
            Err(_) => {
                tracing::warn!(url, timeout_ms = timeout.as_millis(), "image fetch timed out");
                false
            }
            Ok(Err(error)) => {
                tracing::warn!(url, %error, "image fetch failed");
                false
            }
            Ok(Ok(bytes)) => match is_animated(&bytes) {
                Ok(animated) => {
                    tracing::debug!(url, animated, "image verified");
                    animated
                }
                Err(error) => {
                    tracing::debug!(url, %error, "image could not be decoded");
                    false
                }
            },
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<OnceCell<bool>>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F> std::fmt::Debug for AnimationVerifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationVerifier").finish_non_exhaustive()
    }
}
