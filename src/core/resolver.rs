//! Video resolution: cache hit/miss/staleness decision plus the bounded
//! upstream fetch that populates the cache.
//!
//! Each `resolve` call is independent: the calling pass does not proceed
//! until the fetch completes or the timeout elapses, and a failed fetch
//! never mutates the cache.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::adapters::VideoApi;
use crate::domain::epoch_now;

use super::cache::VideoCache;

/// Default upper bound on a single upstream fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from resolving a single video reference.
///
/// All of these are contained to the reference that triggered them; callers
/// downgrade to the original markup plus a diagnostic rather than aborting
/// the build.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("request for video '{id}' failed: {reason}")]
    Network { id: String, reason: String },

    #[error("lookup for video '{id}' timed out after {seconds}s")]
    Timeout { id: String, seconds: u64 },

    #[error("response for video '{id}' did not decode: {reason}")]
    Decode { id: String, reason: String },
}

/// Resolves video IDs to playable URLs through the cache
pub struct Resolver {
    /// Upstream lookup API
    api: Arc<dyn VideoApi>,

    /// Wall-clock bound on each fetch
    fetch_timeout: Duration,
}

impl Resolver {
    /// Create a resolver with the default fetch timeout
    pub fn new(api: Arc<dyn VideoApi>) -> Self {
        Self {
            api,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Override the fetch timeout
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Name of the underlying API adapter
    pub fn api_name(&self) -> &str {
        self.api.name()
    }

    /// Resolve a video ID to its playable URL.
    ///
    /// A cached record whose expiry clears `now + ttl` is returned without
    /// any network access. Otherwise a single bounded fetch runs; on success
    /// the decoded record replaces any prior cache entry. The `ttl` is
    /// caller-supplied so different call sites can choose their own
    /// tolerance for nearly-expired links.
    pub async fn resolve(
        &self,
        cache: &mut VideoCache,
        video_id: &str,
        ttl: Duration,
    ) -> Result<String, ResolveError> {
        let now = epoch_now();

        if let Some(record) = cache.fresh(video_id, now, ttl) {
            debug!(video_id, "Cache hit, skipping upstream lookup");
            return Ok(record.media_url.clone());
        }

        debug!(video_id, "Cache miss or stale entry, fetching upstream");

        let payload = timeout(self.fetch_timeout, self.api.lookup(video_id))
            .await
            .map_err(|_| ResolveError::Timeout {
                id: video_id.to_string(),
                seconds: self.fetch_timeout.as_secs(),
            })??;

        let record = payload.into_record(video_id)?;
        let media_url = record.media_url.clone();

        if cache.insert(record).is_some() {
            debug!(video_id, "Replaced stale cache entry");
        } else {
            info!(video_id, "Cached newly resolved video");
        }

        Ok(media_url)
    }
}
