//! Download status definitions
//!
//! Every archive link handled by the downloader ends in exactly one of these.
use std::fmt;

/// Represents the final status of one archive download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    /// The file was already present locally; nothing was fetched
    Skipped,

    /// The file was fetched and written in full
    Downloaded,

    /// The attempt failed; an error record explains why
    Failed,
}

impl DownloadStatus {
    /// Returns true if this attempt left a complete file on disk
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Skipped | Self::Downloaded)
    }

    /// Returns true if this attempt transferred new data
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Downloaded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
