//! End-to-end scan flow tests
//!
//! Exercises classification, traversal and the extraction chain together on
//! synthesized directory trees. The probe tool is pointed at a nonexistent
//! binary so results stay deterministic on hosts without ffprobe.

use core_metadata::artwork::ArtworkStore;
use core_metadata::probe::FfprobeProber;
use core_metadata::resolver::MetadataResolver;
use core_scanner::LibraryScanner;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn scanner_for(art_dir: &Path) -> LibraryScanner {
    let art_store = Arc::new(ArtworkStore::new(art_dir, 1024 * 1024));
    let prober = Arc::new(FfprobeProber::with_binary(
        "ffprobe-binary-that-does-not-exist",
    ));
    LibraryScanner::new(Arc::new(MetadataResolver::with_default_chain(
        art_store, prober,
    )))
}

/// Writes a one-second silent PCM WAV file. Valid audio with no tags.
fn write_minimal_wav(path: &Path) {
    let sample_rate: u32 = 44100;
    let channels: u16 = 2;
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data = vec![0u8; byte_rate as usize];

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&bits_per_sample.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&data);

    fs::write(path, bytes).expect("Failed to write wav fixture");
}

#[tokio::test]
async fn test_scan_mixed_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("music");
    let nested = root.join("singles");
    fs::create_dir_all(&nested).unwrap();

    // Parseable audio without tags
    write_minimal_wav(&root.join("silence.wav"));
    // Signed as mp3 but truncated, falls through to placeholders
    fs::write(nested.join("track.mp3"), b"ID3\x04\x00\x00\x00\x00\x00\x00").unwrap();
    // Never classified as audio
    fs::write(root.join("readme.txt"), b"hello").unwrap();
    fs::write(root.join("fake.flac"), b"not a flac stream at all").unwrap();

    let scanner = scanner_for(dir.path());
    let outcome = scanner
        .scan(&root.display().to_string())
        .await
        .expect("scan should succeed");

    assert_eq!(outcome.files.len(), 2);

    let mut files = outcome.files;
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let wav = &files[0];
    assert_eq!(wav.name, "silence.wav");
    assert_eq!(wav.file_type, "wav");
    assert_eq!(wav.sample_rate, Some(44100));
    assert_eq!(wav.channels, Some(2));
    // Title falls back to the file stem when tags carry none
    assert_eq!(wav.title.as_deref(), Some("silence"));
    assert!(wav.artist.is_none());
    assert!(wav.last_modified.is_some());
    assert!(wav.size > 0);

    let mp3 = &files[1];
    assert_eq!(mp3.name, "track.mp3");
    assert_eq!(mp3.title.as_deref(), Some("track"));
    assert_eq!(mp3.artist.as_deref(), Some("Unknown Artist"));
    assert_eq!(mp3.album.as_deref(), Some("Unknown Album"));
    assert!(mp3.duration.is_none());
}

#[tokio::test]
async fn test_scan_tree_with_only_non_audio_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("documents");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), b"one").unwrap();
    fs::write(root.join("b.pdf"), b"%PDF-1.4").unwrap();

    let scanner = scanner_for(dir.path());
    let outcome = scanner.scan(&root.display().to_string()).await.unwrap();

    assert!(outcome.files.is_empty());
}

#[tokio::test]
async fn test_repeated_scans_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("music");
    fs::create_dir(&root).unwrap();
    write_minimal_wav(&root.join("first.wav"));

    let scanner = scanner_for(dir.path());
    let first = scanner.scan(&root.display().to_string()).await.unwrap();

    // Rescanning the unchanged tree selects the same files under a new id
    let rescan = scanner.scan(&root.display().to_string()).await.unwrap();
    assert_eq!(first.files.len(), 1);
    assert_eq!(rescan.files.len(), 1);
    assert_eq!(first.files[0].name, rescan.files[0].name);
    assert_ne!(first.scan_id, rescan.scan_id);

    write_minimal_wav(&root.join("second.wav"));
    let second = scanner.scan(&root.display().to_string()).await.unwrap();
    assert_eq!(second.files.len(), 2);
}
