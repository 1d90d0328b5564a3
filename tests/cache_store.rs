//! Cache Store Integration Tests
//!
//! Tests for durable cache load/save behavior, including tolerance of
//! missing and corrupt files.

use tempfile::TempDir;

use streampress::core::VideoCache;
use streampress::domain::ResolvedRecord;

fn record(id: &str, duration: f64) -> ResolvedRecord {
    ResolvedRecord::new(
        id,
        format!(
            "https://cdn-cf-east.streamable.com/video/mp4/{}.mp4?Expires=9700000000",
            id
        ),
        duration,
        9_700_000_000.0,
    )
}

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let temp = TempDir::new().unwrap();
    let cache = VideoCache::load(&temp.path().join("nope.json")).await;
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.json");

    let mut cache = VideoCache::new();
    cache.insert(record("abc", 42.5));
    cache.insert(record("xyz", 7.25));
    cache.save(&path).await.unwrap();

    let loaded = VideoCache::load(&path).await;
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.get("abc").unwrap().duration, 42.5);
    assert_eq!(loaded.get("xyz").unwrap().duration, 7.25);
    assert_eq!(
        loaded.get("abc").unwrap().media_url,
        cache.get("abc").unwrap().media_url
    );
}

#[tokio::test]
async fn test_corrupt_file_loads_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.json");
    tokio::fs::write(&path, "{ this is not json").await.unwrap();

    let cache = VideoCache::load(&path).await;
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_save_overwrites_prior_contents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.json");

    let mut cache = VideoCache::new();
    cache.insert(record("abc", 42.5));
    cache.insert(record("xyz", 7.25));
    cache.save(&path).await.unwrap();

    let mut smaller = VideoCache::new();
    smaller.insert(record("abc", 42.5));
    smaller.save(&path).await.unwrap();

    let loaded = VideoCache::load(&path).await;
    assert_eq!(loaded.len(), 1);
    assert!(loaded.get("xyz").is_none());
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("deeply").join("nested").join("cache.json");

    let mut cache = VideoCache::new();
    cache.insert(record("abc", 1.0));
    cache.save(&path).await.unwrap();

    let loaded = VideoCache::load(&path).await;
    assert_eq!(loaded.len(), 1);
}
