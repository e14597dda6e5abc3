//! Koradi-Archiver: a per-language archive mirror
//!
//! This crate crawls the per-language download sections of a content site,
//! discovers author pages and the `.zip` archives they publish, and mirrors
//! those archives into a local directory tree grouped by language code.

pub mod config;
pub mod crawler;
pub mod events;
pub mod language;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Koradi-Archiver operations
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse markup from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Operation cancelled: {context}")]
    Cancelled { context: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ArchiverError {
    /// Builds a filesystem error for the given path
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Koradi-Archiver operations
pub type Result<T> = std::result::Result<T, ArchiverError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_pipeline, Pipeline};
pub use events::{EventSender, PipelineEvent};
pub use language::Language;
pub use output::PipelineReport;
pub use state::{DownloadOutcome, DownloadStatus, ErrorRecord, ProgressState};
