//! Markup scanning and HTML embedding.
//!
//! The scanner extracts video references from authored markup; the embedder
//! combines them with resolver output to produce HTML5 `<video>` markup.

pub mod embed;
pub mod scanner;

// Re-export key types
pub use embed::{embed, html5_video, source_type};
pub use scanner::{scan_fenced, scan_inline, RefFields, ScanError, VideoRef, FENCE_SENTINEL};
