//! Metadata cache buckets.
//!
//! Records are grouped into buckets (`movies`, `tv`, `tv-<show>`, ...), each
//! stored as one pretty-printed JSON file `<bucket>.metadata` under the cache
//! root. A bucket is read from disk the first time it is needed and kept in
//! memory afterwards.

use super::key::{bucket_path, MetadataKey};
use super::record::Metadata;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to create the cache root
    #[error("Failed to create cache directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to deserialize cache file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize data: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// One bucket file and its records.
#[derive(Debug, Default)]
pub struct Bucket {
    path: PathBuf,
    entries: BTreeMap<String, Metadata>,
}

impl Bucket {
    /// Reads the bucket file. A missing or empty file is an empty bucket.
    pub async fn read(path: PathBuf) -> Result<Self, CacheError> {
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    entries: BTreeMap::new(),
                })
            }
            Err(source) => return Err(CacheError::ReadFailed { path, source }),
        };

        if content.trim().is_empty() {
            return Ok(Self {
                path,
                entries: BTreeMap::new(),
            });
        }

        let entries = serde_json::from_str(&content)
            .map_err(|source| CacheError::DeserializationFailed { path: path.clone(), source })?;
        Ok(Self { path, entries })
    }

    /// Like [`Bucket::read`] but unreadable files are logged and start over empty.
    pub async fn load(path: PathBuf) -> Self {
        info!("Loading metadata cache from file system: {}", path.display());
        match Self::read(path.clone()).await {
            Ok(bucket) => bucket,
            Err(e) => {
                warn!("Ignoring unusable cache bucket: {}", e);
                Self {
                    path,
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Metadata> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, metadata: Metadata) {
        self.entries.insert(key.into(), metadata);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn save(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CacheError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| CacheError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        debug!("Saved {} records to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

/// All buckets under one cache root. Share it through an `Arc`.
pub struct MetadataCache {
    root: PathBuf,
    buckets: Mutex<HashMap<String, Arc<Mutex<Bucket>>>>,
}

impl MetadataCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The named bucket, read from disk on first use.
    pub async fn bucket(&self, name: &str) -> Arc<Mutex<Bucket>> {
        let mut buckets = self.buckets.lock().await;
        if let Some(bucket) = buckets.get(name) {
            return bucket.clone();
        }
        let bucket = Arc::new(Mutex::new(Bucket::load(bucket_path(&self.root, name)).await));
        buckets.insert(name.to_string(), bucket.clone());
        bucket
    }

    /// Looks in the key's own bucket, then for shows in the show's episode bucket.
    pub async fn lookup(&self, key: &MetadataKey) -> Option<Metadata> {
        debug!("Looking up cached metadata for '{}'", key.key());
        if let Some(found) = self.lookup_in(&key.cache_bucket(), key.key()).await {
            return Some(found);
        }
        if let Some(episodes) = key.episode_bucket() {
            if let Some(found) = self.lookup_in(&episodes, key.key()).await {
                debug!("Found '{}' in episode bucket '{}'", key.key(), episodes);
                return Some(found);
            }
        }
        debug!("Entry '{}' not found in cache", key.key());
        None
    }

    pub async fn contains(&self, key: &MetadataKey, lookup_episodes: bool) -> bool {
        if self.contains_in(&key.cache_bucket(), key.key()).await {
            return true;
        }
        match key.episode_bucket() {
            Some(episodes) if lookup_episodes => self.contains_in(&episodes, key.key()).await,
            _ => false,
        }
    }

    /// Replaces the key's record with a copy of `metadata`, writing the bucket if `persist`.
    pub async fn refresh(&self, key: &MetadataKey, metadata: &Metadata, persist: bool) -> Result<(), CacheError> {
        debug!("Refreshing metadata for '{}'", key.key());
        let bucket = self.bucket(&key.cache_bucket()).await;
        let mut bucket = bucket.lock().await;
        bucket.insert(key.key(), metadata.clone());
        if persist {
            bucket.save().await?;
        }
        Ok(())
    }

    pub async fn save(&self, bucket: &str) -> Result<(), CacheError> {
        let bucket = self.bucket(bucket).await;
        let bucket = bucket.lock().await;
        bucket.save().await
    }

    /// Writes the key's bucket to disk.
    pub async fn flush(&self, key: &MetadataKey) -> Result<(), CacheError> {
        self.save(&key.cache_bucket()).await
    }

    /// Lookup that copies a show found only in its episode bucket into the
    /// shared bucket, so later lookups hit directly.
    pub async fn lookup_and_promote(&self, key: &MetadataKey) -> Option<Metadata> {
        let found = self.lookup(key).await?;
        if !self.contains(key, false).await {
            debug!("Updating show cache from episodes cache: {}", key.key());
            if let Err(e) = self.refresh(key, &found, true).await {
                warn!("Failed to persist promoted record '{}': {}", key.key(), e);
            }
        }
        Some(found)
    }

    async fn lookup_in(&self, bucket: &str, key: &str) -> Option<Metadata> {
        let bucket = self.bucket(bucket).await;
        let bucket = bucket.lock().await;
        bucket.get(key).cloned()
    }

    async fn contains_in(&self, bucket: &str, key: &str) -> bool {
        let bucket = self.bucket(bucket).await;
        let bucket = bucket.lock().await;
        bucket.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteProfile;
    use tempfile::TempDir;

    fn key(url: &str) -> MetadataKey {
        MetadataKey::new(url, None, &SiteProfile::default()).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_and_reload() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let movie = key("http://tvshack.cc/movies/Avatar/");
        let record = Metadata::new("Avatar", "Blue people", "");

        let cache = MetadataCache::new(dir.path());
        cache.refresh(&movie, &record, true).await?;
        assert!(dir.path().join("movies.metadata").exists());

        let reopened = MetadataCache::new(dir.path());
        assert_eq!(reopened.lookup(&movie).await, Some(record));
        Ok(())
    }

    #[tokio::test]
    async fn test_unpersisted_refresh_stays_in_memory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let movie = key("http://tvshack.cc/movies/Avatar/");
        let cache = MetadataCache::new(dir.path());
        cache.refresh(&movie, &Metadata::new("Avatar", "p", ""), false).await?;

        assert!(cache.contains(&movie, false).await);
        assert!(!dir.path().join("movies.metadata").exists());

        cache.flush(&movie).await?;
        assert!(dir.path().join("movies.metadata").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_bucket_loaded_once() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let cache = MetadataCache::new(dir.path());
        let first = cache.bucket("movies").await;
        let second = cache.bucket("movies").await;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_bucket_is_empty() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("movies.metadata"), "{ not json")?;
        let cache = MetadataCache::new(dir.path());
        assert_eq!(cache.lookup(&key("http://tvshack.cc/movies/Avatar/")).await, None);

        assert!(matches!(
            Bucket::read(dir.path().join("movies.metadata")).await,
            Err(CacheError::DeserializationFailed { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_show_found_in_episode_bucket() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let show = key("http://tvshack.cc/tv/Dexter/");
        let record = Metadata {
            code: "161".to_string(),
            ..Metadata::new("Dexter", "", "")
        };

        let cache = MetadataCache::new(dir.path());
        cache.refresh(&show.clone().use_show_bucket(true), &record, true).await?;
        assert!(!cache.contains(&show, false).await);
        assert!(cache.contains(&show, true).await);

        assert_eq!(cache.lookup_and_promote(&show).await, Some(record.clone()));
        assert!(cache.contains(&show, false).await);
        assert!(dir.path().join("tv.metadata").exists());
        Ok(())
    }
}
