//! Server binary: wires configuration, the metadata pipeline, the scanner
//! and the HTTP router together, then serves until shutdown.

use std::sync::Arc;

use tracing::{info, warn};

use core_metadata::artwork::ArtworkStore;
use core_metadata::probe::{FfprobeProber, MediaProber};
use core_metadata::resolver::MetadataResolver;
use core_runtime::config::ServerConfig;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_scanner::LibraryScanner;

use scan_server::{app, AppState};

/// Byte budget for the in-memory album-art cache (200 MB).
const ART_CACHE_BYTES: usize = 200 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(ServerConfig::from_env()?);
    init_logging(LoggingConfig::default())?;

    info!("Environment: {}", config.environment);
    info!("Album art directory: {}", config.art_dir.display());

    let art_store = Arc::new(ArtworkStore::new(config.art_dir.clone(), ART_CACHE_BYTES));
    if let Err(err) = art_store.ensure_dir().await {
        // Scans still work without the directory; saving artwork will fail
        // until it becomes available.
        warn!("Could not create album art directory: {}", err);
    }

    let prober: Arc<dyn MediaProber> = Arc::new(FfprobeProber::new());
    let resolver = Arc::new(MetadataResolver::with_default_chain(
        Arc::clone(&art_store),
        prober,
    ));
    let scanner = Arc::new(LibraryScanner::new(resolver));

    let state = AppState::new(scanner, art_store, Arc::clone(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server is running on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
