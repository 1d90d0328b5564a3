//! Duration aggregation over rendered output.
//!
//! This pass runs after embedding, against fully rendered bodies, so it
//! looks for the resolved media URL pattern rather than the authored
//! shorthand. It reads the cache and never triggers fetches.

use std::collections::BTreeSet;

use crate::core::VideoCache;
use crate::domain::{Diagnostics, VideoMetadata};

/// Marker preceding the video ID in a resolved Streamable media URL
pub const MEDIA_URL_MARKER: &str = "streamable.com/video/mp4/";

/// Distinct video IDs referenced by a rendered body.
///
/// Duplicate references collapse here, so each video counts once per
/// document no matter how many times it is embedded.
pub fn extract_video_ids(html: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();

    for chunk in html.split(MEDIA_URL_MARKER).skip(1) {
        if let Some((id, _)) = chunk.split_once(".mp4") {
            if !id.is_empty() {
                ids.insert(id.to_string());
            }
        }
    }

    ids
}

/// Total the durations of every distinct video in one rendered document.
///
/// A rendered reference with no cache entry means the resolution pass never
/// saw it; that inconsistency is reported as a warning and contributes zero.
pub fn aggregate_document(
    cache: &VideoCache,
    document_path: &str,
    rendered_body: &str,
    diagnostics: &mut Diagnostics,
) -> VideoMetadata {
    let mut metadata = VideoMetadata::default();

    for id in extract_video_ids(rendered_body) {
        match cache.get(&id) {
            Some(record) => metadata.add(record.duration),
            None => diagnostics.warning(format!(
                "{}: video '{}' appears in the rendered output but was never resolved; \
                 it does not count toward the document's total duration",
                document_path, id
            )),
        }
    }

    metadata
}
