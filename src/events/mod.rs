//! Pipeline events and their single consumer
//!
//! Pipeline tasks never touch display state directly. They send
//! [`PipelineEvent`]s through a bounded channel, and one
//! [`ProgressAggregator`] applies them in dequeue order.
//!
//! The channel applies backpressure: when it is full a producer waits for
//! capacity instead of dropping events, so progress counters stay exact.

mod aggregator;

pub use aggregator::{AggregatorState, ProgressAggregator};

use crate::output::PipelineReport;
use std::fmt;
use tokio::sync::mpsc;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// A structured log line; presentation decides how to style it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    /// Language code, URL, or pipeline phase the line belongs to
    pub context: String,
    pub message: String,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level.as_str(), self.context, self.message)
    }
}

/// Everything the pipeline reports to the display side
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Log(LogEvent),

    /// Adds `delta` to language `index`'s completed count and, when
    /// `total > 0`, sets its total
    Progress { index: usize, delta: u64, total: u64 },

    /// Final report, sent once after both phases have joined
    Summary(Box<PipelineReport>),

    /// Completion sentinel; nothing is sent after it
    Done,
}

/// Creates the bounded event channel
pub fn event_channel(capacity: usize) -> (EventSender, mpsc::Receiver<PipelineEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, rx)
}

/// Producer handle shared by all pipeline tasks
///
/// Sends are fire-and-forget: if the consumer has gone away the event is
/// discarded and the pipeline carries on.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<PipelineEvent>,
}

impl EventSender {
    /// A sender whose events go nowhere
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self { tx }
    }

    pub async fn send(&self, event: PipelineEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::trace!("Event consumer closed, dropping event");
        }
    }

    pub async fn log(&self, level: LogLevel, context: impl Into<String>, message: impl Into<String>) {
        self.send(PipelineEvent::Log(LogEvent {
            level,
            context: context.into(),
            message: message.into(),
        }))
        .await;
    }

    pub async fn info(&self, context: impl Into<String>, message: impl Into<String>) {
        self.log(LogLevel::Info, context, message).await;
    }

    pub async fn warn(&self, context: impl Into<String>, message: impl Into<String>) {
        self.log(LogLevel::Warn, context, message).await;
    }

    pub async fn error(&self, context: impl Into<String>, message: impl Into<String>) {
        self.log(LogLevel::Error, context, message).await;
    }

    pub async fn progress(&self, index: usize, delta: u64, total: u64) {
        self.send(PipelineEvent::Progress {
            index,
            delta,
            total,
        })
        .await;
    }
}
