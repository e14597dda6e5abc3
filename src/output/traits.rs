//! Output handler trait and errors

use crate::output::PipelineReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Something that can publish the final report of a run
pub trait OutputHandler {
    /// Writes the report to this handler's destination
    fn write_report(&self, report: &PipelineReport) -> OutputResult<()>;
}
