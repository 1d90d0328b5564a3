//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for talking to the upstream video
//! host, so the resolver can be exercised in tests with a deterministic
//! stand-in instead of the real network.

pub mod streamable;

use async_trait::async_trait;

use crate::core::resolver::ResolveError;

// Re-export the Streamable client and its payload types
pub use streamable::{expires_from_url, StreamableClient, VideoPayload};

/// Trait for upstream video lookup APIs
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Fetch the metadata payload for one video ID
    async fn lookup(&self, video_id: &str) -> Result<VideoPayload, ResolveError>;
}
