//! Per-document video metadata.

use serde::{Deserialize, Serialize};

/// Aggregated video metadata for one document.
///
/// Created lazily with a zero total on the first aggregation touch; each
/// distinct video ID in the document's rendered body contributes its
/// duration exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Sum of the durations of every distinct video in the document, in seconds
    pub total_duration: f64,
}

impl VideoMetadata {
    /// Add one video's duration to the total
    pub fn add(&mut self, duration: f64) {
        self.total_duration += duration;
    }
}
