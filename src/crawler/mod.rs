//! Crawler module for discovery and retrieval
//!
//! This module contains the core pipeline logic, including:
//! - HTTP fetching with timeouts and cancellation
//! - Anchor extraction with author/archive predicates
//! - Author and archive crawling per language
//! - Link deduplication
//! - Streaming downloads to disk
//! - Two-phase orchestration across languages

mod archives;
mod authors;
mod coordinator;
mod dedup;
mod downloader;
mod extractor;
mod fetcher;
mod parser;

pub use archives::{crawl_archives, ArchiveCrawl};
pub use authors::crawl_authors;
pub use coordinator::Pipeline;
pub use dedup::dedup;
pub use downloader::{Attempt, Downloader};
pub use extractor::LinkExtractor;
pub use fetcher::{build_http_client, cancellable, fetch_page, open_download};
pub use parser::{extract_hrefs, LinkPredicate};

use crate::config::Config;
use crate::events::EventSender;
use crate::language::Language;
use crate::output::PipelineReport;
use crate::ArchiverError;
use std::path::PathBuf;

/// Runs a complete archive run
///
/// This is the main entry point for mirroring. It will:
/// 1. Build the HTTP client
/// 2. Discover author pages for every language in parallel
/// 3. Crawl, deduplicate, and download archives per language in parallel
/// 4. Send the final summary and completion events
///
/// # Returns
///
/// * `Ok(PipelineReport)` - The run completed (individual failures are in the report)
/// * `Err(ArchiverError)` - The pipeline could not be set up
pub async fn run_pipeline(
    config: &Config,
    languages: Vec<Language>,
    output_root: impl Into<PathBuf>,
    events: EventSender,
) -> Result<PipelineReport, ArchiverError> {
    let pipeline = Pipeline::new(config, languages, output_root, events)?;
    Ok(pipeline.run().await)
}
