//! Configuration module for Koradi-Archiver
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so running without a file
//! is equivalent to loading an empty one.
//!
//! # Example
//!
//! ```no_run
//! use koradi_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Page requests time out after {}s", config.http.request_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, EventsConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
