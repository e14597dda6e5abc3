//! Pipeline coordinator - main orchestration logic
//!
//! A run has two phases separated by barriers:
//!
//! 1. **Discovery**: one task per language fetches the seed page and lists
//!    author links. Languages whose seed page fails are dropped.
//! 2. **Retrieval**: one task per remaining language crawls its author pages,
//!    deduplicates the archive links, and downloads them one at a time.
//!
//! Each phase publishes its results through its own channel. The coordinator
//! is the only consumer of those channels and the only owner of the run's
//! download and error lists.

use crate::config::Config;
use crate::crawler::archives::crawl_archives;
use crate::crawler::authors::crawl_authors;
use crate::crawler::dedup::dedup;
use crate::crawler::downloader::{Attempt, Downloader};
use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::build_http_client;
use crate::events::{EventSender, PipelineEvent};
use crate::language::Language;
use crate::output::{LanguageReport, PipelineReport};
use crate::state::{DownloadOutcome, DownloadStatus, ErrorRecord, LanguageCrawlResult};
use crate::ArchiverError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Message published by a discovery task
struct Discovery {
    index: usize,
    language: Language,
    result: Result<Vec<String>, ArchiverError>,
}

/// Message published by a retrieval task
struct Retrieval {
    index: usize,
    result: LanguageCrawlResult,
}

/// Everything a spawned language task needs, cheap to clone
#[derive(Clone)]
struct TaskContext {
    extractor: LinkExtractor,
    downloader: Downloader,
    events: EventSender,
    output_root: Arc<PathBuf>,
    cancel: CancellationToken,
}

/// Two-phase crawl-and-download pipeline
pub struct Pipeline {
    languages: Vec<Language>,
    context: TaskContext,
}

impl Pipeline {
    /// Creates a pipeline for `languages`, writing under `output_root`
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to run
    /// * `Err(ArchiverError)` - The HTTP client could not be built
    pub fn new(
        config: &Config,
        languages: Vec<Language>,
        output_root: impl Into<PathBuf>,
        events: EventSender,
    ) -> Result<Self, ArchiverError> {
        let client = build_http_client(&config.http)?;

        Ok(Self {
            languages,
            context: TaskContext {
                extractor: LinkExtractor::new(client.clone(), config.http.request_timeout()),
                downloader: Downloader::new(
                    client,
                    config.http.read_timeout(),
                    config.output.keep_partial_files,
                ),
                events,
                output_root: Arc::new(output_root.into()),
                cancel: CancellationToken::new(),
            },
        })
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn output_root(&self) -> &Path {
        &self.context.output_root
    }

    /// Token that stops every in-flight task when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.context.cancel.clone()
    }

    /// Runs both phases to completion and returns the final report
    ///
    /// The report is also sent as a `Summary` event, followed by the `Done`
    /// sentinel.
    pub async fn run(&self) -> PipelineReport {
        let started_at = Utc::now();
        let events = &self.context.events;

        let mut reports: Vec<Option<LanguageReport>> = vec![None; self.languages.len()];
        let mut new_downloads = Vec::new();
        let mut errors = Vec::new();

        events
            .info("discovery", "Searching for available downloads...")
            .await;
        let discovered = self.discover(&mut reports, &mut errors).await;

        for retrieval in self.retrieve(discovered, &mut errors).await {
            let result = retrieval.result;
            for outcome in &result.outcomes {
                if outcome.status == DownloadStatus::Downloaded {
                    if let Some(name) = outcome.file_name() {
                        new_downloads.push(name);
                    }
                }
            }
            reports[retrieval.index] = Some(LanguageReport::from_result(&result));
            errors.extend(result.errors);
        }

        let languages = reports
            .into_iter()
            .zip(&self.languages)
            .map(|(report, language)| {
                report.unwrap_or_else(|| LanguageReport::discovery_failed(language.code.as_str()))
            })
            .collect();

        let report = PipelineReport {
            started_at,
            finished_at: Utc::now(),
            output_root: PathBuf::clone(&self.context.output_root),
            languages,
            new_downloads,
            errors,
            cancelled: self.context.cancel.is_cancelled(),
        };

        tracing::info!(
            "Run finished: {} downloaded, {} skipped, {} failed, {} errors in {}s",
            report.total_downloaded(),
            report.total_skipped(),
            report.total_failed(),
            report.errors.len(),
            report.duration_seconds()
        );

        events
            .info("pipeline", "All available files have been processed")
            .await;
        events
            .send(PipelineEvent::Summary(Box::new(report.clone())))
            .await;
        events.send(PipelineEvent::Done).await;

        report
    }

    /// Phase one: author discovery for every language in parallel
    async fn discover(
        &self,
        reports: &mut [Option<LanguageReport>],
        errors: &mut Vec<ErrorRecord>,
    ) -> Vec<(usize, Language, Vec<String>)> {
        let (tx, mut rx) = mpsc::channel(self.languages.len().max(1));
        let mut tasks = JoinSet::new();

        for (index, language) in self.languages.iter().cloned().enumerate() {
            let tx = tx.clone();
            let ctx = self.context.clone();
            tasks.spawn(async move {
                let result = crawl_authors(&ctx.extractor, &language, &ctx.cancel).await;
                let _ = tx
                    .send(Discovery {
                        index,
                        language,
                        result,
                    })
                    .await;
            });
        }
        drop(tx);

        let mut discovered = Vec::new();
        while let Some(message) = rx.recv().await {
            let Discovery {
                index,
                language,
                result,
            } = message;

            match result {
                Ok(author_links) => discovered.push((index, language, author_links)),
                Err(e) => {
                    tracing::warn!("Dropping language {}: {}", language.code, e);
                    self.context
                        .events
                        .error(
                            language.seed_url.as_str(),
                            format!("Files for {} will not be downloaded: {}", language.code, e),
                        )
                        .await;
                    errors.push(ErrorRecord::from_error(language.seed_url.as_str(), &e));
                    reports[index] = Some(LanguageReport::discovery_failed(language.code));
                }
            }
        }

        join_all(tasks, "discovery", errors).await;

        discovered.sort_by_key(|(index, _, _)| *index);
        discovered
    }

    /// Phase two: per-language archive crawl and download, languages in parallel
    async fn retrieve(
        &self,
        discovered: Vec<(usize, Language, Vec<String>)>,
        errors: &mut Vec<ErrorRecord>,
    ) -> Vec<Retrieval> {
        let (tx, mut rx) = mpsc::channel(discovered.len().max(1));
        let mut tasks = JoinSet::new();

        for (index, language, author_links) in discovered {
            let tx = tx.clone();
            let ctx = self.context.clone();
            tasks.spawn(async move {
                let result = retrieve_language(&ctx, index, language, author_links).await;
                let _ = tx.send(Retrieval { index, result }).await;
            });
        }
        drop(tx);

        let mut retrieved = Vec::new();
        while let Some(message) = rx.recv().await {
            retrieved.push(message);
        }

        join_all(tasks, "retrieval", errors).await;

        retrieved
    }
}

/// Waits for every task of a phase, recording any that panicked
async fn join_all(mut tasks: JoinSet<()>, phase: &str, errors: &mut Vec<ErrorRecord>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("A {} task did not complete: {}", phase, e);
            errors.push(ErrorRecord::new(
                format!("{} task", phase),
                format!("Task did not complete: {}", e),
            ));
        }
    }
}

/// The whole retrieval branch of one language, run sequentially
async fn retrieve_language(
    ctx: &TaskContext,
    index: usize,
    language: Language,
    author_links: Vec<String>,
) -> LanguageCrawlResult {
    let cancel = ctx.cancel.child_token();
    let events = &ctx.events;
    let code = language.code.clone();
    let language_dir = ctx.output_root.join(&code);

    let mut result = LanguageCrawlResult::new(language, author_links);

    if let Err(e) = tokio::fs::create_dir_all(&language_dir).await {
        let error = ArchiverError::filesystem(&language_dir, e);
        events
            .error(code.as_str(), format!("Could not create directory: {}", error))
            .await;
        result.errors.push(ErrorRecord::from_error(code.as_str(), &error));
        result.aborted = true;
        return result;
    }

    events
        .info(
            code.as_str(),
            format!(
                "Checking {} {} links for .zip files...",
                result.author_links.len(),
                code
            ),
        )
        .await;

    let crawl = crawl_archives(
        &ctx.extractor,
        &result.language,
        &result.author_links,
        events,
        &cancel,
    )
    .await;
    if crawl.authors_skipped > 0 {
        events
            .info(
                code.as_str(),
                format!(
                    "Skipped {} links outside the {} section",
                    crawl.authors_skipped, code
                ),
            )
            .await;
    }
    result.errors.extend(crawl.errors);
    result.archive_links = dedup(crawl.links);

    events
        .progress(index, 0, result.archive_links.len() as u64)
        .await;

    for position in 0..result.archive_links.len() {
        if cancel.is_cancelled() {
            result.errors.push(ErrorRecord::new(
                code.as_str(),
                format!(
                    "Cancelled with {} archives not attempted",
                    result.archive_links.len() - position
                ),
            ));
            break;
        }

        let link = &result.archive_links[position];
        let attempt = ctx.downloader.download(link, &language_dir, &cancel).await;
        events.progress(index, 1, 0).await;

        let abort = matches!(attempt, Attempt::LanguageUnavailable(_));
        let outcome = attempt.into_outcome();
        report_outcome(events, &code, &outcome).await;
        if let Some(error) = &outcome.error {
            result.errors.push(error.clone());
        }
        result.outcomes.push(outcome);

        if abort {
            events
                .error(
                    code.as_str(),
                    format!(
                        "Directory {} is unavailable, stopping downloads for {}",
                        language_dir.display(),
                        code
                    ),
                )
                .await;
            result.aborted = true;
            cancel.cancel();
            break;
        }
    }

    tracing::debug!(
        "Language {} finished: {} downloaded, {} skipped, {} failed",
        code,
        result.count(DownloadStatus::Downloaded),
        result.count(DownloadStatus::Skipped),
        result.count(DownloadStatus::Failed)
    );

    result
}

async fn report_outcome(events: &EventSender, code: &str, outcome: &DownloadOutcome) {
    match outcome.status {
        DownloadStatus::Downloaded => {
            events
                .info(code, format!("Downloaded {}", outcome.link))
                .await;
        }
        DownloadStatus::Skipped => {
            tracing::debug!("Already present: {}", outcome.local_path.display());
        }
        DownloadStatus::Failed => {
            let reason = outcome
                .error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("unknown error");
            events
                .warn(
                    code,
                    format!("File {} was not downloaded: {}", outcome.link, reason),
                )
                .await;
        }
    }
}
