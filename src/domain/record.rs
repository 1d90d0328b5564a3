//! Resolved video records.
//!
//! A `ResolvedRecord` is one successfully decoded upstream API result for a
//! single video ID. Records are immutable: a later fetch for the same ID
//! produces a replacement record, never an in-place mutation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resolved video, as cached between builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// Upstream-assigned video identifier
    pub id: String,

    /// Playable media URL, including the host's signed-access parameters
    pub media_url: String,

    /// Playback length in seconds
    pub duration: f64,

    /// Epoch timestamp after which `media_url` is no longer guaranteed valid
    pub expires_at: f64,

    /// When this record was fetched (provenance only; freshness uses `expires_at`)
    #[serde(default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl ResolvedRecord {
    /// Create a record with the current time as its fetch timestamp
    pub fn new(
        id: impl Into<String>,
        media_url: impl Into<String>,
        duration: f64,
        expires_at: f64,
    ) -> Self {
        Self {
            id: id.into(),
            media_url: media_url.into(),
            duration,
            expires_at,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the signed URL still has at least `ttl` of headroom before expiry.
    ///
    /// The tolerance window is caller-supplied: a record that expires within
    /// the window is treated as stale even though the link may still work,
    /// so the caller re-fetches instead of publishing a link about to die.
    pub fn is_fresh(&self, now: f64, ttl: Duration) -> bool {
        self.expires_at > now + ttl.as_secs_f64()
    }
}

/// Current time as epoch seconds, matching the `expires_at` timescale
pub fn epoch_now() -> f64 {
    Utc::now().timestamp() as f64
}
