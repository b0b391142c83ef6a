//! Extraction Strategy Chain
//!
//! Metadata extraction runs through an ordered list of strategies. The first
//! strategy to succeed supplies the record for a file; a failure hands the
//! file to the next strategy. When every strategy fails the resolver falls
//! back to filename-derived defaults, so a scan never drops a file over
//! unreadable metadata.
//!
//! The default chain reads rich container tags first and falls back to an
//! external probe for files whose tags cannot be parsed.

use crate::artwork::ArtworkStore;
use crate::error::Result;
use crate::extractor::TagExtractor;
use crate::probe::{MediaProber, ProbeExtractor};
use crate::types::{file_stem_of, ExtractedMetadata, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// One way of recovering metadata from an audio file.
///
/// Implementations are arranged into a fallback chain by [`MetadataResolver`].
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Attempts to extract metadata from the file at `path`.
    async fn extract(&self, path: &Path) -> Result<ExtractedMetadata>;
}

/// Runs extraction strategies in order until one succeeds.
pub struct MetadataResolver {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl MetadataResolver {
    /// Builds a resolver from an ordered strategy list.
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain: tag parsing first, external probe second.
    pub fn with_default_chain(
        art_store: Arc<ArtworkStore>,
        prober: Arc<dyn MediaProber>,
    ) -> Self {
        Self::new(vec![
            Box::new(TagExtractor::new(art_store)),
            Box::new(ProbeExtractor::new(prober)),
        ])
    }

    /// Extracts whatever metadata the chain can recover for `path`.
    ///
    /// This never fails. When every strategy errors, the failures are logged
    /// and a record of filename-derived defaults is returned so the caller
    /// still lists the file.
    pub async fn resolve(&self, path: &Path) -> ExtractedMetadata {
        for strategy in &self.strategies {
            match strategy.extract(path).await {
                Ok(extracted) => {
                    debug!(
                        "Strategy {} extracted metadata for {}",
                        strategy.name(),
                        path.display()
                    );
                    return extracted;
                }
                Err(e) => {
                    warn!(
                        "Strategy {} failed for {}: {}",
                        strategy.name(),
                        path.display(),
                        e
                    );
                }
            }
        }

        warn!(
            "All extraction strategies failed for {}, using filename defaults",
            path.display()
        );
        ExtractedMetadata {
            title: Some(file_stem_of(path)),
            artist: Some(UNKNOWN_ARTIST.to_string()),
            album: Some(UNKNOWN_ALBUM.to_string()),
            ..Default::default()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
