//! Command-line interface for streampress.
//!
//! Provides commands for running both build phases over a directory of
//! markdown documents, resolving a single video ID, and inspecting the
//! effective configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::StreamableClient;
use crate::config;
use crate::core::{Resolver, VideoCache};
use crate::pipeline::{BuildSession, Document};

/// streampress - Streamable-to-HTML5 video embedding for static site builds
#[derive(Parser, Debug)]
#[command(name = "streampress")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed video references in a directory of markdown documents and
    /// report per-document durations
    Build {
        /// Directory containing markdown documents
        dir: PathBuf,

        /// Output directory for transformed documents (default: <dir>/_rendered)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Cached-link tolerance window in seconds (overrides config)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Resolve one video ID to its playable URL
    Resolve {
        /// Streamable video ID
        video_id: String,

        /// Cached-link tolerance window in seconds (overrides config)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Build { dir, out, ttl } => build_site(&dir, out, ttl).await,
            Commands::Resolve { video_id, ttl } => resolve_video(&video_id, ttl).await,
            Commands::Config => show_config(),
        }
    }
}

/// Run the resolution and aggregation phases over a content directory
async fn build_site(dir: &Path, out: Option<PathBuf>, ttl: Option<u64>) -> Result<()> {
    let config = config::config()?;
    let ttl = Duration::from_secs(ttl.unwrap_or(config.ttl_seconds));
    let out = out.unwrap_or_else(|| dir.join("_rendered"));

    // Collect documents
    let files = collect_markdown_files(dir)?;
    if files.is_empty() {
        println!("No markdown documents found in {}", dir.display());
        return Ok(());
    }

    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        let body = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read document: {}", file.display()))?;

        let relative = file.strip_prefix(dir).unwrap_or(file);
        documents.push(Document::new(relative.to_string_lossy(), body));
    }

    // Resolution phase, then write the transformed documents out
    let api = Arc::new(StreamableClient::with_base_url(&config.api_base_url));
    let mut session = BuildSession::open(&config.cache_path, api, ttl)
        .await
        .with_fetch_timeout(config.fetch_timeout);

    session.pre_render(&mut documents).await?;

    for document in &documents {
        let target = out.join(&document.path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
        tokio::fs::write(&target, &document.body)
            .await
            .with_context(|| format!("Failed to write document: {}", target.display()))?;
    }

    // Aggregation phase over the rendered bodies
    session.post_render(&documents).await?;

    println!("Built {} document(s) into {}", documents.len(), out.display());
    for document in &documents {
        let metadata = session.video_metadata(&document.path);
        if metadata.total_duration > 0.0 {
            println!(
                "  {}: {:.1}s of video",
                document.path, metadata.total_duration
            );
        }
    }

    let diagnostics = session.diagnostics();
    if !diagnostics.is_empty() {
        println!();
        for diagnostic in diagnostics.entries() {
            println!("{}: {}", diagnostic.level, diagnostic.message);
        }
    }

    if diagnostics.has_errors() {
        anyhow::bail!("build completed with errors (output written, see diagnostics above)");
    }

    Ok(())
}

/// Resolve a single video ID through the cache
async fn resolve_video(video_id: &str, ttl: Option<u64>) -> Result<()> {
    let config = config::config()?;
    let ttl = Duration::from_secs(ttl.unwrap_or(config.ttl_seconds));

    let mut cache = VideoCache::load(&config.cache_path).await;
    let api = Arc::new(StreamableClient::with_base_url(&config.api_base_url));
    let resolver = Resolver::new(api).with_fetch_timeout(config.fetch_timeout);

    let media_url = resolver
        .resolve(&mut cache, video_id, ttl)
        .await
        .with_context(|| format!("Failed to resolve video '{}'", video_id))?;

    cache.save(&config.cache_path).await?;

    println!("{}", media_url);
    Ok(())
}

/// Print the effective configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("api_base_url:  {}", config.api_base_url);
    println!("fetch_timeout: {}s", config.fetch_timeout.as_secs());
    println!("cache_path:    {}", config.cache_path.display());
    println!("ttl_seconds:   {}", config.ttl_seconds);
    match &config.config_file {
        Some(path) => println!("config_file:   {}", path.display()),
        None => println!("config_file:   (none found)"),
    }

    Ok(())
}

/// All .md files under a directory, recursively, in stable order
fn collect_markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current)
            .with_context(|| format!("Failed to read directory: {}", current.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "md") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_markdown_files() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("b.md"), "b").unwrap();
        std::fs::write(temp.path().join("a.md"), "a").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "skip").unwrap();
        std::fs::write(temp.path().join("nested/c.md"), "c").unwrap();

        let files = collect_markdown_files(temp.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.md"));
        assert!(files.iter().any(|f| f.ends_with("nested/c.md")));
    }
}
