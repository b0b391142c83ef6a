//! Audio file classification
//!
//! Decides whether a filesystem entry is a playable audio file. Extension
//! matching alone is not trusted: a candidate must also carry a recognizable
//! audio container signature in its first bytes. Both checks have to pass.

use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::warn;

/// File extensions eligible for scanning, lowercase without the dot.
pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "m4a", "flac", "wav", "ogg", "aac"];

/// Bytes read from the head of a candidate file for signature detection.
const SNIFF_LEN: usize = 16;

/// Returns true when `path` has a supported audio extension and its content
/// sniffs as an `audio/` MIME type.
///
/// I/O problems while sniffing are logged and treated as "not audio" so a
/// single unreadable file never aborts a directory walk.
pub async fn is_audio_file(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return false,
    };

    if !AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        return false;
    }

    match sniff_mime_type(path).await {
        Ok(Some(mime)) => mime.starts_with("audio/"),
        Ok(None) => false,
        Err(e) => {
            warn!("Error checking if file is audio {}: {}", path.display(), e);
            false
        }
    }
}

/// Reads the file header and returns the detected MIME type, or `None` when
/// the signature is not recognized.
pub async fn sniff_mime_type(path: &Path) -> io::Result<Option<&'static str>> {
    let mut file = File::open(path).await?;
    let mut header = [0u8; SNIFF_LEN];
    let n = file.read(&mut header).await?;
    Ok(detect_audio_mime(&header[..n]))
}

/// Detects a media container from its magic bytes.
fn detect_audio_mime(header: &[u8]) -> Option<&'static str> {
    if header.len() < 4 {
        return None;
    }

    // ID3v2 tag header, MPEG audio in practice
    if header.starts_with(b"ID3") {
        return Some("audio/mpeg");
    }
    if header.starts_with(b"fLaC") {
        return Some("audio/flac");
    }
    if header.starts_with(b"OggS") {
        return Some("audio/ogg");
    }
    // RIFF: 52 49 46 46 ... 57 41 56 45
    if header.starts_with(b"RIFF") {
        if header.len() >= 12 && &header[8..12] == b"WAVE" {
            return Some("audio/wav");
        }
        return None;
    }
    // ISO-BMFF: 4-byte box size, then "ftyp" and the major brand
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..11] {
            b"M4A" | b"M4B" | b"M4P" => Some("audio/mp4"),
            _ => Some("video/mp4"),
        };
    }
    // ADTS AAC frame sync: 12 set bits with the layer field zero
    if header[0] == 0xFF && header[1] & 0xF6 == 0xF0 {
        return Some("audio/aac");
    }
    // Bare MPEG audio frame sync: 11 set bits
    if header[0] == 0xFF && header[1] & 0xE0 == 0xE0 {
        return Some("audio/mpeg");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_id3_tagged_mp3() {
        let header = b"ID3\x04\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        assert_eq!(detect_audio_mime(header), Some("audio/mpeg"));
    }

    #[test]
    fn test_detect_bare_mpeg_frame() {
        let header = [0xFF, 0xFB, 0x90, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(detect_audio_mime(&header), Some("audio/mpeg"));
    }

    #[test]
    fn test_detect_adts_aac_before_mpeg() {
        // 0xF1 carries the zero layer field, so this must not match as mpeg
        let header = [0xFF, 0xF1, 0x50, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(detect_audio_mime(&header), Some("audio/aac"));
    }

    #[test]
    fn test_detect_flac() {
        let header = b"fLaC\x00\x00\x00\x22\x00\x00\x00\x00\x00\x00\x00\x00";
        assert_eq!(detect_audio_mime(header), Some("audio/flac"));
    }

    #[test]
    fn test_detect_ogg() {
        let header = b"OggS\x00\x02\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        assert_eq!(detect_audio_mime(header), Some("audio/ogg"));
    }

    #[test]
    fn test_detect_wav_requires_wave_form() {
        let wav = b"RIFF\x24\x08\x00\x00WAVEfmt ";
        assert_eq!(detect_audio_mime(wav), Some("audio/wav"));

        let avi = b"RIFF\x24\x08\x00\x00AVI LIST";
        assert_eq!(detect_audio_mime(avi), None);
    }

    #[test]
    fn test_detect_m4a_brand() {
        let m4a = b"\x00\x00\x00\x20ftypM4A \x00\x00\x00\x00";
        assert_eq!(detect_audio_mime(m4a), Some("audio/mp4"));

        // A video brand in an mp4 container is not audio
        let mp4 = b"\x00\x00\x00\x20ftypisom\x00\x00\x00\x00";
        assert_eq!(detect_audio_mime(mp4), Some("video/mp4"));
    }

    #[test]
    fn test_detect_short_or_unknown_header() {
        assert_eq!(detect_audio_mime(b"ID"), None);
        assert_eq!(detect_audio_mime(&[]), None);
        assert_eq!(detect_audio_mime(b"this is plain text here"), None);
    }

    #[tokio::test]
    async fn test_is_audio_file_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"ID3\x04\x00\x00\x00\x00\x00\x00").unwrap();

        // Valid audio signature but disallowed extension
        assert!(!is_audio_file(&path).await);
    }

    #[tokio::test]
    async fn test_is_audio_file_rejects_masquerading_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.mp3");
        fs::write(&path, b"just some text, not audio at all").unwrap();

        assert!(!is_audio_file(&path).await);
    }

    #[tokio::test]
    async fn test_is_audio_file_accepts_matching_extension_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        fs::write(&path, b"ID3\x04\x00\x00\x00\x00\x00\x00\x00\x00").unwrap();

        assert!(is_audio_file(&path).await);
    }

    #[tokio::test]
    async fn test_is_audio_file_rejects_video_in_m4a() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.m4a");
        fs::write(&path, b"\x00\x00\x00\x20ftypisom\x00\x00\x00\x00").unwrap();

        assert!(!is_audio_file(&path).await);
    }

    #[tokio::test]
    async fn test_is_audio_file_missing_file_is_not_audio() {
        assert!(!is_audio_file(Path::new("/nonexistent/song.mp3")).await);
    }
}
