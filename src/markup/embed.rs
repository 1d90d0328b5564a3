//! HTML5 `<video>` markup generation for resolved references.

use std::time::Duration;

use crate::core::{ResolveError, Resolver, VideoCache};

use super::scanner::VideoRef;

/// Resolve a reference and render it as an HTML5 `<video>` element.
///
/// Resolution failures propagate so the caller can report them and keep the
/// original markup in place; a build never ships a broken player.
pub async fn embed(
    resolver: &Resolver,
    cache: &mut VideoCache,
    video_ref: &VideoRef,
    ttl: Duration,
) -> Result<String, ResolveError> {
    let fields = video_ref.fields();
    let media_url = resolver.resolve(cache, &fields.id, ttl).await?;

    Ok(html5_video(
        &fields.id,
        &media_url,
        fields.poster.as_deref(),
        &fields.options,
    ))
}

/// Render the `<video>` element for an already-resolved media URL.
///
/// Poster and option attributes appear only when non-empty.
pub fn html5_video(video_id: &str, media_url: &str, poster: Option<&str>, options: &str) -> String {
    let mut attrs = String::new();

    if let Some(poster) = poster.filter(|p| !p.is_empty()) {
        attrs.push_str(&format!(" poster=\"{}\"", poster));
    }
    if !options.is_empty() {
        attrs.push_str(&format!(" {}", options));
    }

    format!(
        "<video id=\"streamable-video-player-{}\" class=\"streamable-video-player\"{}>\n    <source src=\"{}\" type=\"{}\">\n</video>",
        video_id,
        attrs,
        media_url,
        source_type(media_url)
    )
}

/// MIME-style source type derived from the media URL's path extension.
///
/// Signed-access query parameters are not part of the path and never leak
/// into the extension.
pub fn source_type(media_url: &str) -> String {
    let extension = reqwest::Url::parse(media_url)
        .ok()
        .and_then(|url| {
            url.path()
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
        })
        .unwrap_or_default();

    format!("video/{}", extension)
}
