//! Recursive directory traversal
//!
//! Walks a directory tree depth-first, classifying each file and running the
//! extraction chain on every confirmed audio file. The walk degrades rather
//! than fails: an entry that cannot be processed is logged and dropped, an
//! unreadable subdirectory contributes nothing, and only a root that cannot
//! be listed at all surfaces as an error to the caller.

use crate::classifier;
use crate::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use core_metadata::resolver::MetadataResolver;
use core_metadata::types::{file_stem_of, TrackMetadata};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, DirEntry, ReadDir};
use tracing::{debug, warn};

/// Depth-first walker over a library directory tree.
pub struct DirectoryWalker {
    resolver: Arc<MetadataResolver>,
}

impl DirectoryWalker {
    pub fn new(resolver: Arc<MetadataResolver>) -> Self {
        Self { resolver }
    }

    /// Collects a [`TrackMetadata`] record for every audio file at any depth
    /// under `root`. No ordering guarantee is made over the result.
    ///
    /// Fails only when `root` itself cannot be listed; every deeper error is
    /// absorbed as described in the module docs.
    pub async fn walk(&self, root: &Path) -> Result<Vec<TrackMetadata>> {
        let entries = fs::read_dir(root)
            .await
            .map_err(|e| ScanError::WalkFailed {
                details: e.to_string(),
            })?;

        let mut results = Vec::new();
        self.collect_entries(root, entries, &mut results).await;

        debug!(
            "Walk of {} produced {} audio files",
            root.display(),
            results.len()
        );
        Ok(results)
    }

    /// Recursion point for subdirectories. Listing failures degrade the
    /// subtree to an empty result.
    fn walk_subtree<'a>(
        &'a self,
        dir: PathBuf,
        results: &'a mut Vec<TrackMetadata>,
    ) -> BoxFuture<'a, ()> {
        async move {
            match fs::read_dir(&dir).await {
                Ok(entries) => self.collect_entries(&dir, entries, results).await,
                Err(e) => warn!("Error scanning directory {}: {}", dir.display(), e),
            }
        }
        .boxed()
    }

    async fn collect_entries(
        &self,
        dir: &Path,
        mut entries: ReadDir,
        results: &mut Vec<TrackMetadata>,
    ) {
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error scanning directory {}: {}", dir.display(), e);
                    break;
                }
            };

            let path = entry.path();
            let entry_type = match entry.file_type().await {
                Ok(entry_type) => entry_type,
                Err(e) => {
                    warn!("Error processing file {}: {}", path.display(), e);
                    continue;
                }
            };

            if entry_type.is_dir() {
                self.walk_subtree(path, results).await;
            } else if entry_type.is_file() && classifier::is_audio_file(&path).await {
                match self.process_file(&path, &entry).await {
                    Ok(track) => results.push(track),
                    Err(e) => warn!("Error processing file {}: {}", path.display(), e),
                }
            }
            // Symlinks and special files are skipped
        }
    }

    /// Stats one confirmed audio file and runs the extraction chain on it.
    async fn process_file(&self, path: &Path, entry: &DirEntry) -> io::Result<TrackMetadata> {
        let stats = fs::metadata(path).await?;
        let last_modified = stats.modified().ok().map(DateTime::<Utc>::from);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let mut track = TrackMetadata::from_file_facts(
            path.to_path_buf(),
            entry.file_name().to_string_lossy().into_owned(),
            stats.len(),
            last_modified,
            extension,
        );

        track.apply(self.resolver.resolve(path).await);

        // Last-resort title when no extraction tier produced one
        if track.title.as_deref().map_or(true, str::is_empty) {
            track.title = Some(file_stem_of(path));
        }

        Ok(track)
    }
}
