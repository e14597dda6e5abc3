//! Output module for run reports
//!
//! This module handles:
//! - The report assembled by the orchestrator at the end of a run
//! - Rendering that report as plain text for the terminal
//! - Writing that report as a markdown file

mod markdown;
mod report;
mod summary;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownOutput};
pub use report::{LanguageReport, PipelineReport};
pub use summary::{format_text_summary, ConsoleOutput};
pub use traits::{OutputError, OutputHandler, OutputResult};
