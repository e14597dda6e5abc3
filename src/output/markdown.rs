//! Markdown summary generation
//!
//! This module writes a markdown report of a run: timing, per-language
//! counts, new downloads, and recorded errors.

use crate::output::traits::{OutputHandler, OutputResult};
use crate::output::PipelineReport;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a markdown summary of the run to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &PipelineReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &PipelineReport) -> String {
    let mut md = String::new();

    md.push_str("# Koradi Archive Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!(
        "- **Output Directory**: `{}`\n",
        report.output_root.display()
    ));
    md.push_str(&format!(
        "- **Status**: {}\n\n",
        if report.cancelled { "cancelled" } else { "completed" }
    ));

    // Language breakdown
    md.push_str("## Languages\n\n");
    md.push_str("| Language | Authors | Archives | Downloaded | Skipped | Failed | Notes |\n");
    md.push_str("|----------|---------|----------|------------|---------|--------|-------|\n");
    for language in &report.languages {
        let notes = if language.discovery_failed {
            "listing unavailable"
        } else if language.aborted {
            "aborted"
        } else {
            ""
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            language.code,
            language.author_links,
            language.archive_links,
            language.downloaded,
            language.skipped,
            language.failed,
            notes
        ));
    }
    md.push('\n');

    md.push_str(&format!(
        "## New Downloads ({})\n\n",
        report.new_downloads.len()
    ));
    if report.new_downloads.is_empty() {
        md.push_str("None\n\n");
    } else {
        for name in &report.new_downloads {
            md.push_str(&format!("- `{}`\n", name));
        }
        md.push('\n');
    }

    if report.has_errors() {
        md.push_str(&format!("## Errors ({})\n\n", report.errors.len()));
        md.push_str("| Context | Message |\n");
        md.push_str("|---------|---------|\n");
        for error in &report.errors {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&error.context),
                escape_cell(&error.message)
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Writes the markdown report to a fixed path
#[derive(Debug, Clone)]
pub struct MarkdownOutput {
    path: PathBuf,
}

impl MarkdownOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for MarkdownOutput {
    fn write_report(&self, report: &PipelineReport) -> OutputResult<()> {
        generate_markdown_summary(report, &self.path)
    }
}
