//! Streamable API adapter.
//!
//! One read-only request per video ID against
//! `https://api.streamable.com/videos/{id}`. Only the fields needed for
//! embedding and duration aggregation are modeled.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use super::VideoApi;
use crate::core::resolver::ResolveError;
use crate::domain::ResolvedRecord;

/// Default Streamable API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.streamable.com";

/// HTTP client for the Streamable lookup API
pub struct StreamableClient {
    /// API base URL (overridable for tests and mirrors)
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl Default for StreamableClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamableClient {
    /// Create a client against the default API endpoint
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the lookup URL for a video ID
    fn video_url(&self, video_id: &str) -> String {
        format!("{}/videos/{}", self.base_url, video_id)
    }
}

#[async_trait]
impl VideoApi for StreamableClient {
    fn name(&self) -> &str {
        "streamable"
    }

    async fn lookup(&self, video_id: &str) -> Result<VideoPayload, ResolveError> {
        let url = self.video_url(video_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ResolveError::Network {
                id: video_id.to_string(),
                reason: e.to_string(),
            })?;

        response.json().await.map_err(|e| {
            if e.is_decode() {
                ResolveError::Decode {
                    id: video_id.to_string(),
                    reason: e.to_string(),
                }
            } else {
                ResolveError::Network {
                    id: video_id.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }
}

/// Upstream API result for one video
#[derive(Debug, Clone, Deserialize)]
pub struct VideoPayload {
    /// Available encodings; only the mp4 rendition is used
    pub files: VideoFiles,

    /// Explicit expiry timestamp, when the API supplies one
    #[serde(default)]
    pub expires: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoFiles {
    pub mp4: Mp4File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mp4File {
    /// Signed playable URL
    pub url: String,

    /// Playback length in seconds
    pub duration: f64,
}

impl VideoPayload {
    /// Convert the payload into a cacheable record.
    ///
    /// The explicit `expires` field takes precedence; without it the expiry
    /// must be recoverable from the signed media URL, else the payload is
    /// rejected as undecodable and nothing is cached.
    pub fn into_record(self, video_id: &str) -> Result<ResolvedRecord, ResolveError> {
        let expires_at = match self.expires {
            Some(timestamp) => timestamp,
            None => expires_from_url(&self.files.mp4.url).ok_or_else(|| ResolveError::Decode {
                id: video_id.to_string(),
                reason: "no `expires` field and no `Expires` parameter on the media URL".to_string(),
            })?,
        };

        Ok(ResolvedRecord {
            id: video_id.to_string(),
            media_url: self.files.mp4.url,
            duration: self.files.mp4.duration,
            expires_at,
            fetched_at: Utc::now(),
        })
    }
}

/// Extract the expiry timestamp a signed Streamable URL carries as its
/// `Expires` query parameter.
///
/// This leans on the shape of an external URL, so it stays isolated here;
/// if the upstream signing format changes, this is the only place to touch.
pub fn expires_from_url(media_url: &str) -> Option<f64> {
    let url = reqwest::Url::parse(media_url).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "Expires")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_url() {
        let client = StreamableClient::new();
        assert_eq!(
            client.video_url("4vbhuo"),
            "https://api.streamable.com/videos/4vbhuo"
        );

        let client = StreamableClient::with_base_url("http://localhost:9999/");
        assert_eq!(client.video_url("abc"), "http://localhost:9999/videos/abc");
    }

    #[test]
    fn test_expires_from_url() {
        let url = "https://cdn-cf-east.streamable.com/video/mp4/abc123.mp4\
                   ?Expires=1700000000&Signature=xyz&Key-Pair-Id=K2";
        assert_eq!(expires_from_url(url), Some(1_700_000_000.0));

        // Parameter name is case-sensitive and pinned to the upstream format
        assert_eq!(
            expires_from_url("https://cdn.example/v.mp4?expires=123"),
            None
        );
        assert_eq!(expires_from_url("https://cdn.example/v.mp4"), None);
        assert_eq!(
            expires_from_url("https://cdn.example/v.mp4?Expires=soon"),
            None
        );
        assert_eq!(expires_from_url("not a url"), None);
    }

    #[test]
    fn test_payload_decode() {
        let json = r#"{
            "files": {
                "mp4": {
                    "url": "https://cdn.example/video/mp4/abc.mp4?Expires=1700000000",
                    "duration": 42.5
                }
            }
        }"#;

        let payload: VideoPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.files.mp4.duration, 42.5);
        assert!(payload.expires.is_none());
    }

    #[test]
    fn test_into_record_url_fallback() {
        let payload: VideoPayload = serde_json::from_str(
            r#"{"files": {"mp4": {"url": "https://cdn.example/v.mp4?Expires=1700000000", "duration": 10.0}}}"#,
        )
        .unwrap();

        let record = payload.into_record("abc").unwrap();
        assert_eq!(record.expires_at, 1_700_000_000.0);
        assert_eq!(record.id, "abc");
    }

    #[test]
    fn test_into_record_explicit_expires_wins() {
        let payload: VideoPayload = serde_json::from_str(
            r#"{"files": {"mp4": {"url": "https://cdn.example/v.mp4?Expires=1700000000", "duration": 10.0}}, "expires": 1600000000}"#,
        )
        .unwrap();

        let record = payload.into_record("abc").unwrap();
        assert_eq!(record.expires_at, 1_600_000_000.0);
    }

    #[test]
    fn test_into_record_missing_expiry_is_decode_error() {
        let payload: VideoPayload = serde_json::from_str(
            r#"{"files": {"mp4": {"url": "https://cdn.example/v.mp4", "duration": 10.0}}}"#,
        )
        .unwrap();

        let err = payload.into_record("abc").unwrap_err();
        assert!(matches!(err, ResolveError::Decode { .. }));
    }
}
