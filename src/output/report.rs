//! Final report of a pipeline run

use crate::state::{DownloadStatus, ErrorRecord, LanguageCrawlResult};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Per-language counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageReport {
    pub code: String,
    pub author_links: usize,
    pub archive_links: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,

    /// The seed page could not be crawled; the language never reached retrieval
    pub discovery_failed: bool,

    /// Retrieval stopped early because the language directory was unavailable
    pub aborted: bool,
}

impl LanguageReport {
    /// A language dropped after discovery
    pub fn discovery_failed(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            discovery_failed: true,
            ..Self::default()
        }
    }

    pub fn from_result(result: &LanguageCrawlResult) -> Self {
        Self {
            code: result.language.code.clone(),
            author_links: result.author_links.len(),
            archive_links: result.archive_links.len(),
            downloaded: result.count(DownloadStatus::Downloaded),
            skipped: result.count(DownloadStatus::Skipped),
            failed: result.count(DownloadStatus::Failed),
            discovery_failed: false,
            aborted: result.aborted,
        }
    }

    /// Number of archives handled, whatever the outcome
    pub fn attempted(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

/// Everything the orchestrator accumulated during one run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output_root: PathBuf,

    /// One entry per language, in progress-index order
    pub languages: Vec<LanguageReport>,

    /// File names of archives fetched during this run
    pub new_downloads: Vec<String>,

    /// Every recorded failure, in the order it reached the orchestrator
    pub errors: Vec<ErrorRecord>,

    /// The run was cancelled before it could finish
    pub cancelled: bool,
}

impl PipelineReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    pub fn total_downloaded(&self) -> usize {
        self.languages.iter().map(|l| l.downloaded).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.languages.iter().map(|l| l.skipped).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.languages.iter().map(|l| l.failed).sum()
    }

    pub fn language(&self, code: &str) -> Option<&LanguageReport> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
