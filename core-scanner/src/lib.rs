//! # Library Scanner Module
//!
//! Turns a directory tree of audio files into a list of metadata records.
//!
//! ## Components
//!
//! - **Classifier** (`classifier`): Extension allow-list plus magic-byte
//!   sniffing to decide what counts as audio
//! - **Walker** (`walker`): Depth-first traversal with per-entry error
//!   isolation and subtree degradation
//! - **Service** (`service`): Path normalization, root validation and scan
//!   orchestration consumed by the HTTP layer

pub mod classifier;
pub mod error;
pub mod service;
pub mod walker;

pub use error::{Result, ScanError};
pub use service::{normalize_path, LibraryScanner, ScanOutcome};
pub use walker::DirectoryWalker;
