//! Configuration for streampress.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (STREAMPRESS_CACHE, STREAMPRESS_API_URL)
//! 2. Config file (.streampress/config.yaml)
//! 3. Defaults (~/.streampress, api.streamable.com)
//!
//! Config file discovery:
//! - Searches current directory and parents for .streampress/config.yaml
//! - Paths in the config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::streamable::DEFAULT_API_BASE;

/// Default tolerance window: skip re-checking links that are still good for
/// at least a day
pub const DEFAULT_TTL_SECONDS: u64 = 86_400;

/// Default wall-clock bound on one upstream fetch
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 10;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Lookup API base URL
    pub base_url: Option<String>,
    /// Per-fetch timeout in seconds
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// Cache file path (relative to the config file's parent directory)
    pub path: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Lookup API base URL
    pub api_base_url: String,
    /// Per-fetch timeout
    pub fetch_timeout: Duration,
    /// Absolute path to the cache file
    pub cache_path: PathBuf,
    /// Cached-link tolerance window in seconds
    pub ttl_seconds: u64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".streampress").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path_str)
    }
}

/// Default cache file location (~/.streampress/api-cache.json)
fn default_cache_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home.join(".streampress").join("api-cache.json"))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    // Base for relative paths is the parent of .streampress/
    let base_dir = config_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .map(Path::to_path_buf);

    let api_base_url = if let Ok(env_url) = std::env::var("STREAMPRESS_API_URL") {
        env_url
    } else {
        file.as_ref()
            .and_then(|f| f.api.as_ref())
            .and_then(|a| a.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    };

    let cache_path = if let Ok(env_cache) = std::env::var("STREAMPRESS_CACHE") {
        PathBuf::from(env_cache)
    } else if let Some(path_str) = file
        .as_ref()
        .and_then(|f| f.cache.as_ref())
        .and_then(|c| c.path.clone())
    {
        let base = base_dir.as_deref().unwrap_or(Path::new("."));
        resolve_path(base, &path_str)
    } else {
        default_cache_path()?
    };

    let fetch_timeout_seconds = file
        .as_ref()
        .and_then(|f| f.api.as_ref())
        .and_then(|a| a.timeout_seconds)
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS);

    let ttl_seconds = file
        .as_ref()
        .and_then(|f| f.ttl_seconds)
        .unwrap_or(DEFAULT_TTL_SECONDS);

    Ok(ResolvedConfig {
        api_base_url,
        fetch_timeout: Duration::from_secs(fetch_timeout_seconds),
        cache_path,
        ttl_seconds,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(".streampress");
        std::fs::create_dir_all(&config_dir).unwrap();

        let config_path = config_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
api:
  base_url: http://localhost:9999
  timeout_seconds: 3
cache:
  path: ./build/video-cache.json
ttl_seconds: 3600
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(
            config.api.as_ref().unwrap().base_url.as_deref(),
            Some("http://localhost:9999")
        );
        assert_eq!(config.api.as_ref().unwrap().timeout_seconds, Some(3));
        assert_eq!(
            config.cache.as_ref().unwrap().path.as_deref(),
            Some("./build/video-cache.json")
        );
        assert_eq!(config.ttl_seconds, Some(3600));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/site");

        assert_eq!(
            resolve_path(&base, "./cache.json"),
            PathBuf::from("/home/user/site/./cache.json")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/cache.json"),
            PathBuf::from("/absolute/cache.json")
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_TTL_SECONDS, 86_400);
        assert_eq!(DEFAULT_FETCH_TIMEOUT_SECONDS, 10);
    }
}
