//! Common record types shared by the extraction pipeline and its callers.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Artist shown for files whose tags carry none.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Album shown for files whose tags carry none.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// File name without its extension, used as the title of last resort.
pub fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Track or disc numbering within an album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackNumbering {
    /// Position on the album or disc
    pub no: Option<u32>,
    /// Total count on the album or disc
    pub of: Option<u32>,
}

/// A single lyrics entry attached to a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsEntry {
    /// Lyrics text
    pub text: String,
    /// Human-readable description of where the lyrics came from
    pub description: String,
}

impl LyricsEntry {
    /// Wraps lyrics text found inside the file's own tags.
    pub fn embedded(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: "Embedded lyrics".to_string(),
        }
    }
}

/// Metadata recoverable from an audio file's contents.
///
/// An extraction strategy fills in whatever subset it can; fields it cannot
/// produce stay `None`. File-level facts (path, size, modification time) are
/// not part of this record since they come from the directory walk.
#[derive(Debug, Clone, Default)]
pub struct ExtractedMetadata {
    // Audio properties
    /// Playback length in seconds
    pub duration: Option<f64>,
    /// Bitrate in kilobits per second
    pub bitrate: Option<u32>,
    /// Sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Number of audio channels
    pub channels: Option<u8>,

    // Tag fields
    /// Track title
    pub title: Option<String>,
    /// Primary artist
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Release year
    pub year: Option<u32>,
    /// Track numbering on the album
    pub track: Option<TrackNumbering>,
    /// Disc numbering for multi-disc albums
    pub disk: Option<TrackNumbering>,
    /// Genre labels
    pub genre: Option<Vec<String>>,
    /// Free-form comments
    pub comment: Option<Vec<String>>,
    /// Composers/songwriters
    pub composer: Option<Vec<String>>,
    /// Embedded lyrics entries
    pub lyrics: Option<Vec<LyricsEntry>>,

    // Artwork
    /// Absolute path of the persisted cover image, if one was extracted
    pub album_art_path: Option<PathBuf>,

    /// Underlying parser output kept for diagnostics. Never serialized to clients.
    pub raw_metadata: Option<serde_json::Value>,
}

/// Complete per-file record produced by a library scan.
///
/// Combines filesystem facts gathered during the directory walk with
/// whatever the extraction pipeline recovered from the file contents.
#[derive(Debug, Clone)]
pub struct TrackMetadata {
    /// Full path of the file, rooted at the scanned directory
    pub path: PathBuf,
    /// File name including extension
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Filesystem modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Lowercase file extension without the leading dot
    pub file_type: String,

    /// Playback length in seconds
    pub duration: Option<f64>,
    /// Bitrate in kilobits per second
    pub bitrate: Option<u32>,
    /// Sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Number of audio channels
    pub channels: Option<u8>,

    /// Track title
    pub title: Option<String>,
    /// Primary artist
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Release year
    pub year: Option<u32>,
    /// Track numbering on the album
    pub track: Option<TrackNumbering>,
    /// Disc numbering for multi-disc albums
    pub disk: Option<TrackNumbering>,
    /// Genre labels
    pub genre: Option<Vec<String>>,
    /// Free-form comments
    pub comment: Option<Vec<String>>,
    /// Composers/songwriters
    pub composer: Option<Vec<String>>,
    /// Embedded lyrics entries
    pub lyrics: Option<Vec<LyricsEntry>>,

    /// Absolute path of the persisted cover image, if one was extracted
    pub album_art_path: Option<PathBuf>,

    /// Underlying parser output kept for diagnostics. Never serialized to clients.
    pub raw_metadata: Option<serde_json::Value>,
}

impl TrackMetadata {
    /// Creates a record from filesystem facts alone, with every extracted
    /// field left empty.
    pub fn from_file_facts(
        path: PathBuf,
        name: String,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
        file_type: String,
    ) -> Self {
        Self {
            path,
            name,
            size,
            last_modified,
            file_type,
            duration: None,
            bitrate: None,
            sample_rate: None,
            channels: None,
            title: None,
            artist: None,
            album: None,
            year: None,
            track: None,
            disk: None,
            genre: None,
            comment: None,
            composer: None,
            lyrics: None,
            album_art_path: None,
            raw_metadata: None,
        }
    }

    /// Folds an extraction result into the record.
    pub fn apply(&mut self, extracted: ExtractedMetadata) {
        self.duration = extracted.duration;
        self.bitrate = extracted.bitrate;
        self.sample_rate = extracted.sample_rate;
        self.channels = extracted.channels;
        self.title = extracted.title;
        self.artist = extracted.artist;
        self.album = extracted.album;
        self.year = extracted.year;
        self.track = extracted.track;
        self.disk = extracted.disk;
        self.genre = extracted.genre;
        self.comment = extracted.comment;
        self.composer = extracted.composer;
        self.lyrics = extracted.lyrics;
        self.album_art_path = extracted.album_art_path;
        self.raw_metadata = extracted.raw_metadata;
    }
}
