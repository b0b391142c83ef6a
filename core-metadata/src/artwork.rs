//! Album Art Store - Persist, Serve, and Cache Extracted Cover Images
//!
//! This module manages the on-disk album-art directory, including:
//! - Persisting cover images extracted from audio tags
//! - Collision-resistant file naming
//! - LRU caching of art data with a byte budget for the serving path
//! - Filename sanitation for safe serving
//!
//! ## Overview
//!
//! The `ArtworkStore` owns a flat directory of image files. Extraction hands
//! it raw picture bytes and receives back the absolute path the image was
//! written to; the serving layer asks for images by bare filename and gets
//! cached bytes. Stored files are never garbage collected, so repeated scans
//! of the same library accumulate art files.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::artwork::ArtworkStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ArtworkStore::new("/var/lib/music/album-art", 200 * 1024 * 1024);
//! store.ensure_dir().await?;
//!
//! let path = store.save(&picture_bytes, Some("image/jpeg")).await?;
//! println!("Saved cover to {}", path.display());
//! # Ok(())
//! # }
//! ```

use crate::error::{MetadataError, Result};
use bytes::Bytes;
use lru::LruCache;
use rand::Rng;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Number of distinct images the LRU cache holds at most.
const CACHE_CAPACITY: usize = 100;

/// File extension used when the picture's MIME type carries no usable subtype.
const FALLBACK_EXTENSION: &str = "jpg";

/// On-disk store for extracted album art.
///
/// Also serves as the read path for art delivery, keeping recently requested
/// images in an in-memory LRU cache bounded by both entry count and total
/// byte size.
pub struct ArtworkStore {
    /// Directory art files live in
    dir: PathBuf,
    /// LRU cache of filename to image bytes
    cache: RwLock<LruCache<String, Bytes>>,
    /// Maximum cache size in bytes
    max_cache_size: usize,
    /// Current cache size in bytes
    cache_size: RwLock<usize>,
}

impl ArtworkStore {
    /// Creates a store rooted at `dir` with the given cache byte budget.
    pub fn new(dir: impl Into<PathBuf>, max_cache_size: usize) -> Self {
        let cache_capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("capacity is non-zero");
        Self {
            dir: dir.into(),
            cache: RwLock::new(LruCache::new(cache_capacity)),
            max_cache_size,
            cache_size: RwLock::new(0),
        }
    }

    /// Directory art files are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the art directory if it does not exist yet.
    ///
    /// Failure here is not fatal to the process; saves will simply start
    /// failing until the directory becomes available.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            MetadataError::ArtworkError(format!(
                "Failed to create album art directory {}: {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// Persists one cover image and returns the absolute path it was written to.
    ///
    /// The filename combines the current timestamp with a random component so
    /// concurrent saves cannot collide. The extension is taken from the MIME
    /// subtype when one is present.
    pub async fn save(&self, data: &[u8], mime_type: Option<&str>) -> Result<PathBuf> {
        let extension = mime_type
            .and_then(|m| m.split('/').nth(1))
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_EXTENSION);

        let filename = format!(
            "art-{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            rand::rng().random_range(0..1000),
            extension
        );
        let path = self.dir.join(&filename);

        // Dimensions are logged when the image decodes; undecodable bytes are
        // still written out untouched.
        match image::load_from_memory(data) {
            Ok(img) => debug!(
                "Saving album art {} ({}x{}, {} bytes)",
                filename,
                img.width(),
                img.height(),
                data.len()
            ),
            Err(e) => debug!(
                "Saving album art {} ({} bytes, dimensions unknown: {})",
                filename,
                data.len(),
                e
            ),
        }

        tokio::fs::write(&path, data).await.map_err(|e| {
            MetadataError::ArtworkError(format!(
                "Failed to write album art {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(path)
    }

    /// Loads an art file by bare filename, consulting the cache first.
    ///
    /// Returns `Ok(None)` when the file does not exist or when the filename
    /// fails sanitation. Filenames carrying path separators or parent-dir
    /// components never reach the filesystem.
    pub async fn load(&self, filename: &str) -> Result<Option<Bytes>> {
        if !is_safe_filename(filename) {
            warn!("Rejected album art request with unsafe filename: {:?}", filename);
            return Ok(None);
        }

        {
            let mut cache = self.cache.write().await;
            if let Some(data) = cache.get(filename) {
                debug!("Album art {} served from cache", filename);
                return Ok(Some(data.clone()));
            }
        }

        let path = self.dir.join(filename);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetadataError::Io(e)),
        };

        self.add_to_cache(filename.to_string(), data.clone()).await;

        debug!("Album art {} loaded from disk", filename);
        Ok(Some(data))
    }

    /// Adds image bytes to the LRU cache, evicting until the byte budget holds.
    async fn add_to_cache(&self, filename: String, data: Bytes) {
        let data_size = data.len();

        let mut cache_size = self.cache_size.write().await;
        let mut cache = self.cache.write().await;

        while *cache_size + data_size > self.max_cache_size && !cache.is_empty() {
            if let Some((_, evicted)) = cache.pop_lru() {
                *cache_size -= evicted.len();
                debug!("Evicted album art from cache (size: {})", evicted.len());
            }
        }

        // push reports whatever entry it displaced, whether a replaced value
        // under the same key or the LRU victim of a full cache.
        if let Some((_, displaced)) = cache.push(filename.clone(), data) {
            *cache_size -= displaced.len();
        }
        *cache_size += data_size;

        debug!(
            "Cached album art {} ({} bytes, total cache: {} bytes)",
            filename, data_size, *cache_size
        );
    }

    /// Cache statistics as (entry count, total bytes).
    pub async fn cache_stats(&self) -> (usize, usize) {
        let count = self.cache.read().await.len();
        let size = *self.cache_size.read().await;
        (count, size)
    }
}

/// Content type to serve an art file with, derived from its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// A filename is safe when it names a plain file inside the art directory.
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small_store(dir: &Path, max_bytes: usize) -> ArtworkStore {
        ArtworkStore::new(dir, max_bytes)
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = ArtworkStore::new("/tmp/does-not-matter", 100 * 1024 * 1024);

        let (count, size) = store.cache_stats().await;
        assert_eq!(count, 0);
        assert_eq!(size, 0);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = small_store(dir.path(), 1024 * 1024);
        store.ensure_dir().await.unwrap();

        let path = store.save(b"not really a jpeg", Some("image/jpeg")).await.unwrap();
        let filename = path.file_name().unwrap().to_str().unwrap().to_string();

        assert!(filename.starts_with("art-"));
        assert!(filename.ends_with(".jpeg"));
        assert!(path.starts_with(dir.path()));

        let loaded = store.load(&filename).await.unwrap();
        assert_eq!(loaded, Some(Bytes::from_static(b"not really a jpeg")));

        // Second load comes from cache
        let (count, size) = store.cache_stats().await;
        assert_eq!(count, 1);
        assert_eq!(size, b"not really a jpeg".len());
        let cached = store.load(&filename).await.unwrap();
        assert_eq!(cached, Some(Bytes::from_static(b"not really a jpeg")));
    }

    #[tokio::test]
    async fn test_save_falls_back_to_jpg_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = small_store(dir.path(), 1024);
        store.ensure_dir().await.unwrap();

        let path = store.save(b"data", None).await.unwrap();
        assert!(path.to_str().unwrap().ends_with(".jpg"));

        let path = store.save(b"data", Some("image/")).await.unwrap();
        assert!(path.to_str().unwrap().ends_with(".jpg"));

        let path = store.save(b"data", Some("image/png")).await.unwrap();
        assert!(path.to_str().unwrap().ends_with(".png"));
    }

    #[tokio::test]
    async fn test_save_without_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created");
        let store = small_store(&missing, 1024);

        let result = store.save(b"data", Some("image/png")).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to write album art"));
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = small_store(dir.path(), 1024);

        let loaded = store.load("art-123-456.jpg").await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_load_rejects_unsafe_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let store = small_store(dir.path(), 1024);

        assert_eq!(store.load("").await.unwrap(), None);
        assert_eq!(store.load("../secret.txt").await.unwrap(), None);
        assert_eq!(store.load("a/b.jpg").await.unwrap(), None);
        assert_eq!(store.load("a\\b.jpg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cache_eviction_respects_byte_budget() {
        let dir = tempfile::tempdir().unwrap();
        let store = small_store(dir.path(), 1000);

        let data1 = Bytes::from(vec![0u8; 600]);
        let data2 = Bytes::from(vec![1u8; 600]);

        store.add_to_cache("id1".to_string(), data1).await;
        let (count, size) = store.cache_stats().await;
        assert_eq!(count, 1);
        assert_eq!(size, 600);

        // Adding the second item evicts the first
        store.add_to_cache("id2".to_string(), data2).await;
        let (count, size) = store.cache_stats().await;
        assert_eq!(count, 1);
        assert_eq!(size, 600);
    }

    #[tokio::test]
    async fn test_cache_replacement_keeps_size_accurate() {
        let dir = tempfile::tempdir().unwrap();
        let store = small_store(dir.path(), 1000);

        store
            .add_to_cache("id1".to_string(), Bytes::from(vec![0u8; 300]))
            .await;
        store
            .add_to_cache("id1".to_string(), Bytes::from(vec![1u8; 400]))
            .await;

        let (count, size) = store.cache_stats().await;
        assert_eq!(count, 1);
        assert_eq!(size, 400);
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("cover.jpg"), "image/jpeg");
        assert_eq!(content_type_for("cover.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("cover.png"), "image/png");
        assert_eq!(content_type_for("cover.webp"), "image/webp");
        assert_eq!(content_type_for("cover.gif"), "image/gif");
        assert_eq!(content_type_for("cover"), "application/octet-stream");
        assert_eq!(content_type_for("cover.xyz"), "application/octet-stream");
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("art-1-2.jpg"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../art.jpg"));
        assert!(!is_safe_filename("sub/art.jpg"));
        assert!(!is_safe_filename("sub\\art.jpg"));
    }
}
