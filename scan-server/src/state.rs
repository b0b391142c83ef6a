//! Shared application state.

use core_metadata::artwork::ArtworkStore;
use core_runtime::config::ServerConfig;
use core_scanner::LibraryScanner;
use std::sync::Arc;

/// State shared by every request handler.
///
/// Cloning is cheap: each field is a reference-counted handle to a service
/// constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Directory scan service
    pub scanner: Arc<LibraryScanner>,
    /// Album-art persistence and serving
    pub art_store: Arc<ArtworkStore>,
    /// Process configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        scanner: Arc<LibraryScanner>,
        art_store: Arc<ArtworkStore>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            scanner,
            art_store,
            config,
        }
    }
}
