//! State module for tracking run progress and results
//!
//! # Components
//!
//! - `DownloadStatus`: The terminal status of a single archive download
//! - `DownloadOutcome`, `ErrorRecord`, `LanguageCrawlResult`: Per-run records
//! - `ProgressState`: Per-language completed/total counters

mod download_state;
mod progress_state;
mod records;

// Re-export main types
pub use download_state::DownloadStatus;
pub use progress_state::ProgressState;
pub use records::{DownloadOutcome, ErrorRecord, LanguageCrawlResult};
