//! # Server Configuration Module
//!
//! Provides configuration management for the music library scan server.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `ServerConfig`
//! instance holding the network, environment, and storage settings for the
//! server process. It enforces fail-fast validation so an invalid configuration
//! is rejected at startup rather than surfacing mid-request.
//!
//! Settings can be provided programmatically through the builder or loaded from
//! the process environment with [`ServerConfig::from_env`]:
//!
//! | Variable          | Meaning                                | Default              |
//! |-------------------|----------------------------------------|----------------------|
//! | `HOST`            | Listen address                         | `0.0.0.0`            |
//! | `PORT`            | Listen port                            | `3001`               |
//! | `APP_ENV`         | `development` or `production`          | `development`        |
//! | `ALBUM_ART_DIR`   | Album-art storage directory            | `<cwd>/album-art`    |
//! | `ALLOWED_ORIGINS` | Comma-separated CORS origin allow-list | per-environment list |
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ServerConfig;
//!
//! let config = ServerConfig::builder()
//!     .port(8080)
//!     .art_dir("/var/lib/music/album-art")
//!     .build()
//!     .expect("Failed to build config");
//! assert_eq!(config.bind_addr(), "0.0.0.0:8080");
//! ```

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Directory name used for album-art storage when none is configured,
/// resolved relative to the process working directory.
pub const DEFAULT_ART_DIR_NAME: &str = "album-art";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default maximum accepted request body size (50 MiB).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Origins allowed to call the API when running in development mode.
const DEV_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:8080",
    "http://127.0.0.1:8080",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Deployment environment of the server process.
///
/// Controls how much diagnostic detail error responses carry and which
/// CORS origins are allowed by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "Unknown environment '{}' (expected 'development' or 'production')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server configuration for the music library scan server.
///
/// Use [`ServerConfigBuilder`] to construct instances.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub host: String,

    /// Port the HTTP listener binds to
    pub port: u16,

    /// Deployment environment (gates error-response diagnostics)
    pub environment: Environment,

    /// Directory where extracted album art is persisted and served from
    pub art_dir: PathBuf,

    /// CORS origin allow-list
    pub allowed_origins: Vec<String>,

    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// Creates a new builder for constructing a `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Loads configuration from process environment variables.
    ///
    /// Unset variables fall back to their defaults; set-but-invalid values
    /// (e.g. a non-numeric `PORT`) are rejected with [`Error::Config`].
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(host) = std::env::var("HOST") {
            builder = builder.host(host);
        }

        if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT value: '{}'", port)))?;
            builder = builder.port(port);
        }

        if let Ok(env) = std::env::var("APP_ENV") {
            builder = builder.environment(env.parse()?);
        }

        if let Ok(dir) = std::env::var("ALBUM_ART_DIR") {
            builder = builder.art_dir(dir);
        }

        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            builder = builder.allowed_origins(origins);
        }

        builder.build()
    }

    /// The `host:port` string the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("Listen host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(Error::Config(
                "Listen port must be greater than 0".to_string(),
            ));
        }

        if self.art_dir.as_os_str().is_empty() {
            return Err(Error::Config(
                "Album-art directory cannot be empty".to_string(),
            ));
        }

        if self.allowed_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(Error::Config(
                "CORS origin allow-list entries cannot be empty".to_string(),
            ));
        }

        if self.body_limit_bytes == 0 {
            return Err(Error::Config(
                "Request body limit must be greater than 0 bytes".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for constructing [`ServerConfig`] instances.
///
/// Unset fields take documented defaults when [`build()`](ServerConfigBuilder::build)
/// runs; the finished config is validated before being returned.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    environment: Option<Environment>,
    art_dir: Option<PathBuf>,
    allowed_origins: Option<Vec<String>>,
    body_limit_bytes: Option<usize>,
}

impl ServerConfigBuilder {
    /// Sets the listen address. Default: `0.0.0.0`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the listen port. Default: `3001`.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the deployment environment. Default: `Development`.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the album-art storage directory.
    ///
    /// Default: `album-art` under the process working directory.
    pub fn art_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.art_dir = Some(path.into());
        self
    }

    /// Sets the CORS origin allow-list.
    ///
    /// Default: localhost development origins in `Development`, empty in
    /// `Production`.
    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(origins);
        self
    }

    /// Sets the maximum accepted request body size in bytes. Default: 50 MiB.
    pub fn body_limit_bytes(mut self, limit: usize) -> Self {
        self.body_limit_bytes = Some(limit);
        self
    }

    /// Builds the final `ServerConfig`, applying defaults and validating.
    pub fn build(self) -> Result<ServerConfig> {
        let environment = self.environment.unwrap_or_default();

        let art_dir = self.art_dir.unwrap_or_else(|| {
            std::env::current_dir()
                .map(|cwd| cwd.join(DEFAULT_ART_DIR_NAME))
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ART_DIR_NAME))
        });

        let allowed_origins = self.allowed_origins.unwrap_or_else(|| match environment {
            Environment::Development => {
                DEV_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
            }
            Environment::Production => Vec::new(),
        });

        let config = ServerConfig {
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            environment,
            art_dir,
            allowed_origins,
            body_limit_bytes: self.body_limit_bytes.unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
        };

        config.validate()?;

        Ok(config)
    }
}
