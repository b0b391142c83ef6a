//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the music library server:
//! - Logging and tracing infrastructure
//! - Server configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other workspace crates depend
//! on. It establishes the logging conventions and the configuration surface
//! used throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
