//! Library scan orchestration
//!
//! `LibraryScanner` is the entry point consumed by the HTTP layer. It
//! validates and normalizes the requested root, then hands off to the
//! [`DirectoryWalker`](crate::walker::DirectoryWalker) and reports the
//! outcome together with timing information.
//!
//! Validation failures (missing path, not a directory, unreadable) are
//! distinct error variants so the caller can map them to client errors,
//! while a walk that fails after validation passed is an internal fault.

use crate::error::{Result, ScanError};
use crate::walker::DirectoryWalker;
use core_metadata::resolver::MetadataResolver;
use core_metadata::types::TrackMetadata;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of one completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Correlation id for log lines belonging to this scan
    pub scan_id: Uuid,
    /// Every audio file found under the scanned root
    pub files: Vec<TrackMetadata>,
    /// Wall-clock time the walk took
    pub elapsed: Duration,
}

/// Coordinates validation and traversal for library scans.
pub struct LibraryScanner {
    walker: DirectoryWalker,
}

impl LibraryScanner {
    pub fn new(resolver: Arc<MetadataResolver>) -> Self {
        Self {
            walker: DirectoryWalker::new(resolver),
        }
    }

    /// Scans `directory` for audio files.
    ///
    /// The path is normalized lexically before use. The target must exist,
    /// be a directory and be listable by the process; each of those checks
    /// failing maps to its own [`ScanError`] variant.
    pub async fn scan(&self, directory: &str) -> Result<ScanOutcome> {
        let scan_id = Uuid::new_v4();
        let normalized = normalize_path(directory);
        let display_path = normalized.display().to_string();

        info!("Scan {} requested for directory: {}", scan_id, display_path);

        let stats = fs::metadata(&normalized)
            .await
            .map_err(|e| ScanError::NotAccessible {
                path: display_path.clone(),
                details: e.to_string(),
                code: Some(format!("{:?}", e.kind())),
            })?;

        if !stats.is_dir() {
            return Err(ScanError::NotADirectory { path: display_path });
        }

        // Probe readability up front so a permission problem surfaces as a
        // validation failure instead of an empty scan
        fs::read_dir(&normalized)
            .await
            .map_err(|e| ScanError::NotReadable {
                path: display_path.clone(),
                details: e.to_string(),
            })?;
        debug!("Directory is accessible: {}", display_path);

        let start = Instant::now();
        let files = self.walker.walk(&normalized).await?;
        let elapsed = start.elapsed();

        info!(
            "Scan {} completed in {:.2}s. Found {} audio files in {}",
            scan_id,
            elapsed.as_secs_f64(),
            files.len(),
            display_path
        );

        Ok(ScanOutcome {
            scan_id,
            files,
            elapsed,
        })
    }
}

/// Lexically normalizes a path: collapses `.` segments, resolves `..`
/// against preceding components where possible and canonicalizes
/// separators. Relative paths stay relative; nothing touches the
/// filesystem here.
pub fn normalize_path(input: &str) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in Path::new(input).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `..` above the root collapses away
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
