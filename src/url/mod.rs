//! URL handling module for Koradi-Archiver
//!
//! This module provides href resolution, language membership checks, and
//! local file name derivation for discovered links.

mod filename;
mod matcher;
mod resolve;

// Re-export main functions
pub use filename::file_name_from_url;
pub use matcher::belongs_to_language;
pub use resolve::resolve_link;
