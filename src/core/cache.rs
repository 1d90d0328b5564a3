//! Durable cache of resolved video records.
//!
//! Simple JSON file keyed by video ID. Loaded once per build; a cold or
//! damaged cache yields an empty mapping instead of failing the build.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::ResolvedRecord;

/// In-memory mapping of video ID to resolved record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCache {
    /// Cache format version
    pub version: u32,

    /// All cached records, keyed by video ID
    pub entries: HashMap<String, ResolvedRecord>,
}

impl Default for VideoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            version: 1,
            entries: HashMap::new(),
        }
    }

    /// Load the cache from disk.
    ///
    /// Missing or unparseable files degrade to an empty cache so content
    /// generation is never blocked by cache state.
    pub async fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No cache file, starting cold");
            return Self::new();
        }

        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cache file, starting cold");
                return Self::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cache file did not parse, starting cold");
                Self::new()
            }
        }
    }

    /// Save the full cache to disk, overwriting prior contents
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write cache: {}", path.display()))?;

        Ok(())
    }

    /// Get a record by video ID
    pub fn get(&self, video_id: &str) -> Option<&ResolvedRecord> {
        self.entries.get(video_id)
    }

    /// Get a record only if its expiry still clears `now + ttl`
    pub fn fresh(&self, video_id: &str, now: f64, ttl: Duration) -> Option<&ResolvedRecord> {
        self.entries
            .get(video_id)
            .filter(|record| record.is_fresh(now, ttl))
    }

    /// Insert a record, returning the entry it replaced (if any)
    pub fn insert(&mut self, record: ResolvedRecord) -> Option<ResolvedRecord> {
        self.entries.insert(record.id.clone(), record)
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
