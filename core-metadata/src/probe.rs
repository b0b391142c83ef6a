//! External Probe Fallback
//!
//! When tag parsing fails, basic audio properties are recovered by invoking
//! `ffprobe` and parsing its JSON output. The probe sits behind a trait so
//! tests can substitute a double for the external binary.

use crate::error::{MetadataError, Result};
use crate::resolver::ExtractionStrategy;
use crate::types::{self, ExtractedMetadata};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Audio properties recovered by a media probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    /// Playback length in seconds
    pub duration: Option<f64>,
    /// Bitrate in kilobits per second
    pub bitrate: Option<u32>,
    /// Sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Number of audio channels
    pub channels: Option<u8>,
}

/// Probes a media file for its basic audio properties.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeReport>;
}

/// `ffprobe`-backed prober.
pub struct FfprobeProber {
    /// Binary name or path handed to the process spawner
    binary: String,
}

impl FfprobeProber {
    /// Resolves `ffprobe` from the process PATH.
    pub fn new() -> Self {
        Self {
            binary: "ffprobe".to_string(),
        }
    }

    /// Uses a specific binary instead of resolving `ffprobe` from PATH.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeReport> {
        debug!("Probing {} with {}", path.display(), self.binary);

        let output = Command::new(&self.binary)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration,bit_rate")
            .arg("-show_entries")
            .arg("stream=sample_rate,channels")
            .arg("-of")
            .arg("json")
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                MetadataError::ProbeFailed(format!("Failed to run {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MetadataError::ProbeFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| MetadataError::ProbeFailed(format!("Invalid probe output: {}", e)))?;

        Ok(parsed.into_report())
    }
}

/// Top-level shape of `ffprobe -of json` output. Numeric values arrive as
/// strings in the format section.
#[derive(Debug, Default, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeStream {
    sample_rate: Option<String>,
    channels: Option<u32>,
}

impl FfprobeOutput {
    fn into_report(self) -> ProbeReport {
        let stream = self.streams.into_iter().next().unwrap_or_default();

        ProbeReport {
            duration: self
                .format
                .duration
                .as_deref()
                .and_then(|d| d.parse::<f64>().ok()),
            bitrate: self
                .format
                .bit_rate
                .as_deref()
                .and_then(|b| b.parse::<u64>().ok())
                .map(|b| (b as f64 / 1000.0).round() as u32),
            sample_rate: stream
                .sample_rate
                .as_deref()
                .and_then(|s| s.parse::<u32>().ok()),
            channels: stream.channels.and_then(|c| u8::try_from(c).ok()),
        }
    }
}

/// Probe-backed extraction strategy.
///
/// Produces the minimal record: audio properties from the probe plus a
/// filename-derived title and placeholder artist/album. A probe failure is
/// absorbed and the placeholders alone are returned, so the chain still
/// yields a usable record for every file.
pub struct ProbeExtractor {
    prober: Arc<dyn MediaProber>,
}

impl ProbeExtractor {
    pub fn new(prober: Arc<dyn MediaProber>) -> Self {
        Self { prober }
    }
}

#[async_trait]
impl ExtractionStrategy for ProbeExtractor {
    fn name(&self) -> &'static str {
        "probe"
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedMetadata> {
        let mut extracted = ExtractedMetadata {
            title: Some(types::file_stem_of(path)),
            artist: Some(types::UNKNOWN_ARTIST.to_string()),
            album: Some(types::UNKNOWN_ALBUM.to_string()),
            ..Default::default()
        };

        match self.prober.probe(path).await {
            Ok(report) => {
                extracted.duration = report.duration;
                extracted.bitrate = report.bitrate;
                extracted.sample_rate = report.sample_rate;
                extracted.channels = report.channels;
            }
            Err(e) => {
                warn!("Error getting basic metadata for {}: {}", path.display(), e);
            }
        }

        Ok(extracted)
    }
}

// =============================================================================
// Tests
// =============================================================================
