//! Plain-text run summary

use crate::output::traits::{OutputHandler, OutputResult};
use crate::output::PipelineReport;

/// Formats the end-of-run summary shown in the terminal
///
/// Lists every newly downloaded file (or "None") and every recorded error.
pub fn format_text_summary(report: &PipelineReport) -> String {
    let mut out = String::new();

    if report.cancelled {
        out.push_str("Run was cancelled before completion\n\n");
    } else {
        out.push_str("All available files have been processed\n\n");
    }

    out.push_str(&format!("Files are stored in: {}\n\n", report.output_root.display()));

    for language in &report.languages {
        if language.discovery_failed {
            out.push_str(&format!("{}: listing unavailable\n", language.code));
            continue;
        }
        out.push_str(&format!(
            "{}: {} archives ({} new, {} already present, {} failed){}\n",
            language.code,
            language.archive_links,
            language.downloaded,
            language.skipped,
            language.failed,
            if language.aborted { " [aborted]" } else { "" }
        ));
    }

    out.push_str("\nNew downloads include:\n");
    if report.new_downloads.is_empty() {
        out.push_str("None\n");
    } else {
        for name in &report.new_downloads {
            out.push_str(name);
            out.push('\n');
        }
    }

    if report.has_errors() {
        out.push_str(&format!("\nErrors ({}):\n", report.errors.len()));
        for error in &report.errors {
            out.push_str(&format!("- {}\n", error));
        }
    }

    out
}

/// Prints the text summary to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl OutputHandler for ConsoleOutput {
    fn write_report(&self, report: &PipelineReport) -> OutputResult<()> {
        print!("{}", format_text_summary(report));
        Ok(())
    }
}
