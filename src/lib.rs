//! streampress - Streamable-to-HTML5 video embedding for static site builds
//!
//! Resolves short Streamable video IDs embedded in authored markdown into
//! self-contained HTML5 `<video>` markup, then totals per-document video
//! durations in a second pass over the rendered output.
//!
//! # Architecture
//!
//! The system is built around a TTL-governed resolution cache:
//! - Upstream API results are cached to disk between builds
//! - A cached link is reused while its expiry clears the caller's tolerance
//!   window, so repeated builds avoid redundant API calls
//! - Resolution (scan + embed, may fetch) must run before aggregation
//!   (read-only duration totals); the ordering is enforced per build
//!
//! # Modules
//!
//! - `adapters`: Upstream video host integration (Streamable)
//! - `core`: Cache, resolver, and phase ordering
//! - `markup`: Reference scanning and HTML embedding
//! - `aggregate`: Per-document duration totals
//! - `pipeline`: Build session and content-pipeline hooks
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Transform a directory of markdown and report durations
//! streampress build content/
//!
//! # Resolve one video ID
//! streampress resolve 4vbhuo
//! ```

pub mod adapters;
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod markup;
pub mod pipeline;

// Re-export main types at crate root for convenience
pub use crate::core::{BuildPhase, PhaseError, ResolveError, Resolver, VideoCache};
pub use domain::{Diagnostic, Diagnostics, Level, ResolvedRecord, VideoMetadata};
pub use markup::{RefFields, ScanError, VideoRef};
pub use pipeline::{BuildSession, Document};

// Upstream adapter
pub use adapters::{StreamableClient, VideoApi, VideoPayload};
