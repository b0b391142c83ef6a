//! Audio Tag Extraction
//!
//! This module provides the rich extraction path, reading metadata from audio
//! files with the `lofty` crate. It supports ID3v2, Vorbis Comments, MP4 tags,
//! and FLAC.
//!
//! ## Overview
//!
//! - Extracts tag metadata (title, artist, album, year, numbering, genre, etc.)
//! - Extracts audio properties (duration, bitrate, sample rate, channels)
//! - Persists the first embedded cover image through the [`ArtworkStore`]
//! - Attaches a diagnostic summary of the parser output to the record
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::artwork::ArtworkStore;
//! use core_metadata::extractor::TagExtractor;
//! use core_metadata::resolver::ExtractionStrategy;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ArtworkStore::new("album-art", 200 * 1024 * 1024));
//! let extractor = TagExtractor::new(store);
//! let metadata = extractor.extract(Path::new("song.mp3")).await?;
//!
//! println!("Title: {}", metadata.title.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::artwork::ArtworkStore;
use crate::error::{MetadataError, Result};
use crate::resolver::ExtractionStrategy;
use crate::types::{ExtractedMetadata, LyricsEntry, TrackNumbering};
use async_trait::async_trait;
use lofty::config::ParseOptions;
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::picture::MimeType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tag-based metadata extractor.
///
/// Reads the file's container tags and audio properties. Parsing failures are
/// reported as errors so the caller can fall back to a cheaper strategy.
pub struct TagExtractor {
    /// Parse options for lofty
    parse_options: ParseOptions,
    /// Store the first embedded cover image is persisted to
    art_store: Arc<ArtworkStore>,
}

impl TagExtractor {
    /// Create a new extractor persisting artwork into `art_store`.
    pub fn new(art_store: Arc<ArtworkStore>) -> Self {
        Self {
            parse_options: ParseOptions::new(),
            art_store,
        }
    }

    /// Map tag fields into the common record.
    fn from_tag(tag: &Tag) -> ExtractedMetadata {
        let genre = Self::text_values(tag, &ItemKey::Genre);
        let comment = Self::text_values(tag, &ItemKey::Comment);
        let composer = Self::text_values(tag, &ItemKey::Composer);
        let lyrics: Vec<LyricsEntry> = tag
            .get_strings(&ItemKey::Lyrics)
            .map(LyricsEntry::embedded)
            .collect();

        ExtractedMetadata {
            title: tag.title().map(|s| s.into_owned()),
            artist: tag.artist().map(|s| s.into_owned()),
            album: tag.album().map(|s| s.into_owned()),
            year: tag.year(),
            track: Some(TrackNumbering {
                no: tag.track(),
                of: tag.track_total(),
            }),
            disk: Some(TrackNumbering {
                no: tag.disk(),
                of: tag.disk_total(),
            }),
            genre: (!genre.is_empty()).then_some(genre),
            comment: (!comment.is_empty()).then_some(comment),
            composer: (!composer.is_empty()).then_some(composer),
            lyrics: (!lyrics.is_empty()).then_some(lyrics),
            ..Default::default()
        }
    }

    /// All text values stored under one tag key.
    fn text_values(tag: &Tag, key: &ItemKey) -> Vec<String> {
        tag.get_strings(key).map(str::to_string).collect()
    }

    /// Convert a picture's MIME type into the string form used for naming
    /// the stored art file. Unrecognized types pass their raw string through.
    fn picture_mime_type(mime_type: &MimeType) -> Option<String> {
        match mime_type {
            MimeType::Png => Some("image/png".to_string()),
            MimeType::Jpeg => Some("image/jpeg".to_string()),
            MimeType::Tiff => Some("image/tiff".to_string()),
            MimeType::Bmp => Some("image/bmp".to_string()),
            MimeType::Gif => Some("image/gif".to_string()),
            MimeType::Unknown(other) => Some(other.clone()),
            _ => None,
        }
    }

    /// Convert lofty FileType to MIME type string
    fn file_type_to_mime_type(file_type: lofty::file::FileType) -> String {
        use lofty::file::FileType;
        match file_type {
            FileType::Aac => "audio/aac",
            FileType::Aiff => "audio/aiff",
            FileType::Ape => "audio/ape",
            FileType::Flac => "audio/flac",
            FileType::Mpeg => "audio/mpeg",
            FileType::Mp4 => "audio/mp4",
            FileType::Mpc => "audio/musepack",
            FileType::Opus => "audio/opus",
            FileType::Vorbis => "audio/vorbis",
            FileType::Speex => "audio/speex",
            FileType::Wav => "audio/wav",
            FileType::WavPack => "audio/wavpack",
            _ => "application/octet-stream",
        }
        .to_string()
    }

    /// Compact summary of the parser output, kept on the record for
    /// diagnostics instead of the unserializable parser types.
    fn raw_summary(tagged_file: &TaggedFile) -> serde_json::Value {
        let properties = tagged_file.properties();
        serde_json::json!({
            "fileType": format!("{:?}", tagged_file.file_type()),
            "mimeType": Self::file_type_to_mime_type(tagged_file.file_type()),
            "durationMs": properties.duration().as_millis() as u64,
            "audioBitrateKbps": properties.audio_bitrate(),
            "overallBitrateKbps": properties.overall_bitrate(),
            "sampleRateHz": properties.sample_rate(),
            "bitDepth": properties.bit_depth(),
            "channels": properties.channels(),
            "tagTypes": tagged_file
                .tags()
                .iter()
                .map(|t| format!("{:?}", t.tag_type()))
                .collect::<Vec<_>>(),
        })
    }
}

#[async_trait]
impl ExtractionStrategy for TagExtractor {
    fn name(&self) -> &'static str {
        "tags"
    }

    /// Extract metadata from the audio file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be opened or read
    /// - File format cannot be identified
    /// - Parsing errors prevent any metadata extraction
    async fn extract(&self, path: &Path) -> Result<ExtractedMetadata> {
        debug!("Extracting tag metadata from: {}", path.display());

        let file_data = tokio::fs::read(path)
            .await
            .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to read file: {}", e)))?;

        let tagged_file = Probe::new(std::io::Cursor::new(&file_data))
            .options(self.parse_options)
            .guess_file_type()
            .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to probe file: {}", e)))?
            .read()
            .map_err(|e| MetadataError::ExtractionFailed(format!("Failed to parse file: {}", e)))?;

        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());

        let mut extracted = match tag {
            Some(tag) => Self::from_tag(tag),
            None => {
                debug!("No tags found in file: {}", path.display());
                ExtractedMetadata::default()
            }
        };

        let properties = tagged_file.properties();
        extracted.duration = Some(properties.duration().as_secs_f64());
        extracted.bitrate = properties.audio_bitrate();
        extracted.sample_rate = properties.sample_rate();
        extracted.channels = properties.channels();

        if let Some(picture) = tag.and_then(|t| t.pictures().first()) {
            let mime_type = picture.mime_type().and_then(Self::picture_mime_type);
            match self
                .art_store
                .save(picture.data(), mime_type.as_deref())
                .await
            {
                Ok(art_path) => extracted.album_art_path = Some(art_path),
                Err(e) => warn!("Error processing album art for {}: {}", path.display(), e),
            }
        }

        extracted.raw_metadata = Some(Self::raw_summary(&tagged_file));

        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::tag::{ItemValue, TagItem, TagType};

    #[test]
    fn test_from_tag_maps_core_fields() {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title("Test Title".to_string());
        tag.set_artist("Test Artist".to_string());
        tag.set_album("Test Album".to_string());
        tag.set_year(2019);
        tag.set_track(3);
        tag.set_track_total(12);
        tag.set_disk(1);
        tag.set_disk_total(2);

        let extracted = TagExtractor::from_tag(&tag);

        assert_eq!(extracted.title.as_deref(), Some("Test Title"));
        assert_eq!(extracted.artist.as_deref(), Some("Test Artist"));
        assert_eq!(extracted.album.as_deref(), Some("Test Album"));
        assert_eq!(extracted.year, Some(2019));
        assert_eq!(
            extracted.track,
            Some(TrackNumbering {
                no: Some(3),
                of: Some(12)
            })
        );
        assert_eq!(
            extracted.disk,
            Some(TrackNumbering {
                no: Some(1),
                of: Some(2)
            })
        );
    }

    #[test]
    fn test_from_tag_empty_tag_keeps_numbering_present() {
        let tag = Tag::new(TagType::Id3v2);

        let extracted = TagExtractor::from_tag(&tag);

        assert!(extracted.title.is_none());
        assert!(extracted.artist.is_none());
        // Numbering exists as an object even when no numbers are tagged
        assert_eq!(extracted.track, Some(TrackNumbering::default()));
        assert_eq!(extracted.disk, Some(TrackNumbering::default()));
        assert!(extracted.genre.is_none());
        assert!(extracted.lyrics.is_none());
    }

    #[test]
    fn test_from_tag_collects_multiple_genres() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.push(TagItem::new(
            ItemKey::Genre,
            ItemValue::Text("Rock".to_string()),
        ));
        tag.push(TagItem::new(
            ItemKey::Genre,
            ItemValue::Text("Blues".to_string()),
        ));

        let extracted = TagExtractor::from_tag(&tag);

        assert_eq!(
            extracted.genre,
            Some(vec!["Rock".to_string(), "Blues".to_string()])
        );
    }

    #[test]
    fn test_from_tag_wraps_lyrics_entries() {
        let mut tag = Tag::new(TagType::Id3v2);
        tag.push(TagItem::new(
            ItemKey::Lyrics,
            ItemValue::Text("la la la".to_string()),
        ));

        let extracted = TagExtractor::from_tag(&tag);

        let lyrics = extracted.lyrics.expect("lyrics should be present");
        assert_eq!(lyrics.len(), 1);
        assert_eq!(lyrics[0].text, "la la la");
        assert_eq!(lyrics[0].description, "Embedded lyrics");
    }

    #[test]
    fn test_picture_mime_type() {
        assert_eq!(
            TagExtractor::picture_mime_type(&MimeType::Png),
            Some("image/png".to_string())
        );
        assert_eq!(
            TagExtractor::picture_mime_type(&MimeType::Jpeg),
            Some("image/jpeg".to_string())
        );
        assert_eq!(
            TagExtractor::picture_mime_type(&MimeType::Unknown("image/webp".to_string())),
            Some("image/webp".to_string())
        );
    }

    #[test]
    fn test_file_type_to_mime_type() {
        use lofty::file::FileType;

        assert_eq!(
            TagExtractor::file_type_to_mime_type(FileType::Mpeg),
            "audio/mpeg"
        );
        assert_eq!(
            TagExtractor::file_type_to_mime_type(FileType::Flac),
            "audio/flac"
        );
        assert_eq!(
            TagExtractor::file_type_to_mime_type(FileType::Mp4),
            "audio/mp4"
        );
        assert_eq!(
            TagExtractor::file_type_to_mime_type(FileType::Opus),
            "audio/opus"
        );
    }
}
