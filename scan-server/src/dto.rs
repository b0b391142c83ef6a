//! Wire types for the scan API.
//!
//! Scan results cross the HTTP boundary as a reduced, client-safe projection.
//! Internal fields (raw parser output, modification times, numbering details)
//! never leave the server, and album-art locations are rewritten from
//! filesystem paths to the URL they are served under.

use core_metadata::types::{file_stem_of, TrackMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use core_scanner::ScanOutcome;
use serde::Serialize;
use std::path::Path;

/// URL prefix album art is served under.
pub const ALBUM_ART_MOUNT: &str = "/album-art";

/// Successful scan response.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub count: usize,
    #[serde(rename = "scanTime")]
    pub scan_time: String,
    pub files: Vec<ScannedFile>,
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        let files: Vec<ScannedFile> = outcome.files.into_iter().map(ScannedFile::from).collect();
        Self {
            success: true,
            count: files.len(),
            scan_time: format!("{:.2}s", outcome.elapsed.as_secs_f64()),
            files,
        }
    }
}

/// Client-safe projection of one scanned audio file.
#[derive(Debug, Serialize)]
pub struct ScannedFile {
    pub path: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<Vec<String>>,
    #[serde(rename = "sampleRate", skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    #[serde(rename = "albumArtPath", skip_serializing_if = "Option::is_none")]
    pub album_art_path: Option<String>,
}

impl From<TrackMetadata> for ScannedFile {
    fn from(track: TrackMetadata) -> Self {
        // Empty tag values fall back the same way missing ones do.
        let title = track
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| file_stem_of(&track.path));
        let artist = track
            .artist
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let album = track
            .album
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());
        let album_art_path = track.album_art_path.as_deref().and_then(public_art_path);

        Self {
            path: track.path.to_string_lossy().into_owned(),
            name: track.name,
            size: track.size,
            file_type: track.file_type,
            duration: track.duration,
            bitrate: track.bitrate,
            title,
            artist,
            album,
            year: track.year,
            genre: track.genre,
            sample_rate: track.sample_rate,
            channels: track.channels,
            album_art_path,
        }
    }
}

/// Rewrites an absolute art path to the URL it is served under.
///
/// Only the basename is exposed so responses never leak the server's
/// filesystem layout.
fn public_art_path(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| format!("{}/{}", ALBUM_ART_MOUNT, name.to_string_lossy()))
}

// =============================================================================
// Tests
// =============================================================================
