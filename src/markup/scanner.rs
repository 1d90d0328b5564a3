//! Extraction of video references from authored markup.
//!
//! Two encodings are recognized:
//!
//! Fenced block:
//!
//! ````text
//! ```streamable
//! video: 4vbhuo
//! poster: /files/IMG_5190.JPG
//! options: controls muted autoplay loop
//! ```
//! ````
//!
//! Inline image whose payload is a compact JSON object:
//!
//! ```text
//! ![{"video": "4vbhuo", "poster": "/img.jpg", "options": "muted"}](x)
//! ```
//!
//! Non-matching input is not an error; the markup passes through untouched.
//! Only a recognized fenced block that lacks its required `video:` line is
//! reported back to the caller.

use serde::Deserialize;
use thiserror::Error;

/// Opening fence that marks a video block
pub const FENCE_SENTINEL: &str = "```streamable";

/// A recognized reference that is missing a required field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("streamable block is missing its required `{field}:` line")]
    MissingField { field: &'static str },
}

/// The normalized fields every reference form carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefFields {
    /// Upstream video ID
    pub id: String,

    /// Poster image URL or path
    pub poster: Option<String>,

    /// Free-text attribute string for the `<video>` element
    pub options: String,
}

/// A video reference, tagged by the markup form it was written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRef {
    Fenced(RefFields),
    Inline(RefFields),
}

impl VideoRef {
    /// The normalized fields, independent of source form
    pub fn fields(&self) -> &RefFields {
        match self {
            VideoRef::Fenced(fields) | VideoRef::Inline(fields) => fields,
        }
    }
}

/// Scan a fenced code block for a video reference.
///
/// Returns `None` when the block is not a streamable block at all, and
/// `Some(Err(..))` when the sentinel matched but the `video:` line is
/// missing, so the caller can report it and keep the original markup.
pub fn scan_fenced(block: &str) -> Option<Result<VideoRef, ScanError>> {
    let rest = block.strip_prefix(FENCE_SENTINEL)?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let mut id = None;
    let mut poster = None;
    let mut options = None;

    for line in rest.lines() {
        if line.trim_end().starts_with("```") {
            break;
        }

        if let Some(value) = line.strip_prefix("video: ") {
            id = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("poster: ") {
            poster = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("options: ") {
            options = Some(value.trim().to_string());
        }
    }

    match id {
        Some(id) if !id.is_empty() => Some(Ok(VideoRef::Fenced(RefFields {
            id,
            poster,
            options: options.unwrap_or_default(),
        }))),
        _ => Some(Err(ScanError::MissingField { field: "video" })),
    }
}

/// JSON payload carried by the inline image form
#[derive(Debug, Deserialize)]
struct InlinePayload {
    video: String,

    #[serde(default)]
    options: String,

    #[serde(default)]
    poster: Option<String>,
}

/// Scan image markup for an inline video reference.
///
/// The payload is everything from the first `{` to the last `}`; markup
/// whose payload does not parse as the expected object is simply not a
/// match.
pub fn scan_inline(markup: &str) -> Option<VideoRef> {
    let start = markup.find('{')?;
    let end = markup.rfind('}')?;
    if end < start {
        return None;
    }

    let payload: InlinePayload = serde_json::from_str(&markup[start..=end]).ok()?;

    Some(VideoRef::Inline(RefFields {
        id: payload.video,
        poster: payload.poster,
        options: payload.options,
    }))
}
