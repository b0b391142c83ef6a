//! # Metadata Extraction Module
//!
//! Extracts metadata from audio files and manages extracted album art.
//!
//! ## Overview
//!
//! This module handles:
//! - Audio tag extraction (ID3, Vorbis, MP4, FLAC)
//! - External probe fallback for files with unreadable tags
//! - Album art persistence and cached serving
//! - The strategy chain tying the extraction paths together

pub mod artwork;
pub mod error;
pub mod extractor;
pub mod probe;
pub mod resolver;
pub mod types;

pub use error::{MetadataError, Result};
