//! Build session and content-pipeline hooks.
//!
//! A `BuildSession` owns everything one build mutates: the video cache, the
//! phase state machine, per-document metadata, and the diagnostics list.
//! The surrounding pipeline drives it through two injection points:
//!
//! 1. `pre_render` — before content parsing: scan authored bodies and embed
//!    video markup, fetching and caching as needed
//! 2. `post_render` — after rendering: total per-document durations from
//!    the cache, read-only
//!
//! Out-of-order invocation is reported as an error-level diagnostic and the
//! offending phase does no work; the build itself carries on.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, instrument};

use crate::adapters::VideoApi;
use crate::aggregate::aggregate_document;
use crate::core::{BuildPhase, Resolver, VideoCache};
use crate::domain::{Diagnostics, VideoMetadata};
use crate::markup::{embed, scan_fenced, scan_inline, VideoRef, FENCE_SENTINEL};

/// One content document moving through the build
#[derive(Debug, Clone)]
pub struct Document {
    /// Document identity (typically its source path)
    pub path: String,

    /// Markup body; authored markdown before `pre_render`, rendered output
    /// by the time `post_render` sees it
    pub body: String,
}

impl Document {
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }
}

/// Context object owning all mutable state for one build
pub struct BuildSession {
    cache: VideoCache,
    cache_path: PathBuf,
    resolver: Resolver,
    ttl: Duration,
    phase: BuildPhase,
    metadata: HashMap<String, VideoMetadata>,
    diagnostics: Diagnostics,
}

impl BuildSession {
    /// Open a session, loading the cache from disk (cold or damaged cache
    /// files degrade to an empty cache)
    pub async fn open(
        cache_path: impl Into<PathBuf>,
        api: Arc<dyn VideoApi>,
        ttl: Duration,
    ) -> Self {
        let cache_path = cache_path.into();
        let cache = VideoCache::load(&cache_path).await;

        info!(
            cached = cache.len(),
            cache_path = %cache_path.display(),
            "Opened build session"
        );

        Self {
            cache,
            cache_path,
            resolver: Resolver::new(api),
            ttl,
            phase: BuildPhase::default(),
            metadata: HashMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Override the per-fetch timeout
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.resolver = self.resolver.with_fetch_timeout(fetch_timeout);
        self
    }

    /// Pre-render hook: embed video references in every authored body.
    ///
    /// Runs at most once, and only before aggregation; a violation is
    /// reported and the pass is skipped. The cache is persisted afterward.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn pre_render(&mut self, documents: &mut [Document]) -> Result<()> {
        if let Err(e) = self.phase.begin_resolution() {
            self.diagnostics.error(e.to_string());
            return Ok(());
        }

        for document in documents.iter_mut() {
            let path = document.path.clone();
            document.body = self.rewrite_body(&path, &document.body).await;
        }

        self.cache.save(&self.cache_path).await?;
        Ok(())
    }

    /// Post-render hook: total per-document durations from the cache.
    ///
    /// Requires `pre_render` to have run; read-only against the cache. The
    /// cache is persisted afterward as a durability checkpoint.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub async fn post_render(&mut self, documents: &[Document]) -> Result<()> {
        if let Err(e) = self.phase.begin_aggregation() {
            self.diagnostics.error(e.to_string());
            return Ok(());
        }

        for document in documents {
            let totals = aggregate_document(
                &self.cache,
                &document.path,
                &document.body,
                &mut self.diagnostics,
            );

            let entry = self.metadata.entry(document.path.clone()).or_default();
            entry.total_duration += totals.total_duration;
        }

        self.cache.save(&self.cache_path).await?;
        Ok(())
    }

    /// Aggregated metadata for one document.
    ///
    /// Asking before aggregation has run is answered with the zero value
    /// plus a warning, never a failure.
    pub fn video_metadata(&mut self, document_path: &str) -> VideoMetadata {
        if !self.phase.aggregation_ran() {
            self.diagnostics.warning(format!(
                "{}: video metadata was requested before duration aggregation ran; \
                 reporting a zero total",
                document_path
            ));
            return VideoMetadata::default();
        }

        self.metadata
            .get(document_path)
            .copied()
            .unwrap_or_default()
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The in-memory cache
    pub fn cache(&self) -> &VideoCache {
        &self.cache
    }

    /// Replace recognized video references in one authored body.
    ///
    /// Fenced streamable blocks and inline image references become `<video>`
    /// markup; everything else, including other fenced code, passes through
    /// byte-for-byte. Failures keep the original markup and are recorded.
    async fn rewrite_body(&mut self, document_path: &str, body: &str) -> String {
        let mut output: Vec<String> = Vec::new();
        let mut lines = body.lines();

        while let Some(line) = lines.next() {
            if line == FENCE_SENTINEL {
                // Collect the whole block through its closing fence
                let mut block = vec![line.to_string()];
                for block_line in lines.by_ref() {
                    let closes = block_line.trim_end().starts_with("```");
                    block.push(block_line.to_string());
                    if closes {
                        break;
                    }
                }

                let block = block.join("\n");
                output.push(self.embed_fenced(document_path, &block).await);
            } else if line.trim_start().starts_with("```") {
                // Some other fenced block; copy verbatim so code samples
                // are never rewritten
                output.push(line.to_string());
                for block_line in lines.by_ref() {
                    let closes = block_line.trim_end().starts_with("```");
                    output.push(block_line.to_string());
                    if closes {
                        break;
                    }
                }
            } else if line.contains("![") {
                output.push(self.embed_inline_refs(document_path, line).await);
            } else {
                output.push(line.to_string());
            }
        }

        let mut rewritten = output.join("\n");
        if body.ends_with('\n') {
            rewritten.push('\n');
        }
        rewritten
    }

    /// Embed one fenced block, or return it unchanged with a diagnostic
    async fn embed_fenced(&mut self, document_path: &str, block: &str) -> String {
        match scan_fenced(block) {
            Some(Ok(video_ref)) => self.embed_ref(document_path, &video_ref, block).await,
            Some(Err(e)) => {
                self.diagnostics
                    .error(format!("{}: {}", document_path, e));
                block.to_string()
            }
            None => block.to_string(),
        }
    }

    /// Embed every inline image reference found in one line
    async fn embed_inline_refs(&mut self, document_path: &str, line: &str) -> String {
        let mut output = String::with_capacity(line.len());
        let mut rest = line;

        while let Some(start) = rest.find("![") {
            // The image markup spans `![` through the `)` that closes its
            // destination; anything short of that shape passes through.
            let Some(end) = rest[start..]
                .find("](")
                .and_then(|mid| rest[start + mid..].find(')').map(|close| start + mid + close))
            else {
                break;
            };

            let markup = &rest[start..=end];
            output.push_str(&rest[..start]);

            match scan_inline(markup) {
                Some(video_ref) => {
                    output.push_str(&self.embed_ref(document_path, &video_ref, markup).await);
                }
                None => output.push_str(markup),
            }

            rest = &rest[end + 1..];
        }

        output.push_str(rest);
        output
    }

    /// Resolve and render one reference; on failure keep the original markup
    async fn embed_ref(
        &mut self,
        document_path: &str,
        video_ref: &VideoRef,
        original: &str,
    ) -> String {
        match embed(&self.resolver, &mut self.cache, video_ref, self.ttl).await {
            Ok(html) => html,
            Err(e) => {
                self.diagnostics
                    .error(format!("{}: {}", document_path, e));
                original.to_string()
            }
        }
    }
}
