use crate::language::Language;
use crate::state::DownloadStatus;
use crate::ArchiverError;
use std::fmt;
use std::path::PathBuf;

/// A recorded, non-fatal failure
///
/// Records are append-only and surfaced verbatim in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// The URL or operation the failure belongs to
    pub context: String,

    /// Human readable description
    pub message: String,
}

impl ErrorRecord {
    pub fn new(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn from_error(context: impl Into<String>, error: &ArchiverError) -> Self {
        Self::new(context, error.to_string())
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.message)
    }
}

/// Result of handling one archive link
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub link: String,
    pub local_path: PathBuf,
    pub status: DownloadStatus,
    pub error: Option<ErrorRecord>,
}

impl DownloadOutcome {
    pub fn skipped(link: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            link: link.into(),
            local_path: local_path.into(),
            status: DownloadStatus::Skipped,
            error: None,
        }
    }

    pub fn downloaded(link: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            link: link.into(),
            local_path: local_path.into(),
            status: DownloadStatus::Downloaded,
            error: None,
        }
    }

    pub fn failed(
        link: impl Into<String>,
        local_path: impl Into<PathBuf>,
        error: ErrorRecord,
    ) -> Self {
        Self {
            link: link.into(),
            local_path: local_path.into(),
            status: DownloadStatus::Failed,
            error: Some(error),
        }
    }

    /// The file name component of the local path
    pub fn file_name(&self) -> Option<String> {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Everything one language task discovered and attempted during a run
///
/// Owned by the task handling the language until it is published to the
/// orchestrator at the end of the task.
#[derive(Debug, Clone)]
pub struct LanguageCrawlResult {
    pub language: Language,
    pub author_links: Vec<String>,
    /// Deduplicated, in author-iteration order
    pub archive_links: Vec<String>,
    pub outcomes: Vec<DownloadOutcome>,
    pub errors: Vec<ErrorRecord>,
    /// Set when the language's root directory became unavailable mid-run
    pub aborted: bool,
}

impl LanguageCrawlResult {
    pub fn new(language: Language, author_links: Vec<String>) -> Self {
        Self {
            language,
            author_links,
            archive_links: Vec::new(),
            outcomes: Vec::new(),
            errors: Vec::new(),
            aborted: false,
        }
    }

    pub fn count(&self, status: DownloadStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
