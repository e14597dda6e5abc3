//! Single-consumer progress aggregator
//!
//! The aggregator is the only writer of [`ProgressState`]. It moves through
//! `Idle → Running → Done`: the first event starts it, every log or progress
//! event keeps it running, and the completion sentinel finishes it. Events
//! that arrive after `Done` are ignored.

use crate::events::{LogEvent, PipelineEvent};
use crate::language::Language;
use crate::output::PipelineReport;
use crate::state::ProgressState;
use tokio::sync::mpsc;

const BAR_WIDTH: usize = 30;

/// Lifecycle of the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Idle,
    Running,
    Done,
}

/// In-memory view of a run, built from pipeline events
#[derive(Debug)]
pub struct ProgressAggregator {
    state: AggregatorState,
    labels: Vec<String>,
    progress: Vec<ProgressState>,
    logs: Vec<LogEvent>,
    summary: Option<PipelineReport>,
    applied: u64,
}

impl ProgressAggregator {
    /// Creates an idle aggregator with one progress slot per language
    pub fn new(languages: &[Language]) -> Self {
        Self {
            state: AggregatorState::Idle,
            labels: languages.iter().map(|l| l.code.clone()).collect(),
            progress: vec![ProgressState::default(); languages.len()],
            logs: Vec::new(),
            summary: None,
            applied: 0,
        }
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    pub fn progress(&self) -> &[ProgressState] {
        &self.progress
    }

    pub fn progress_for(&self, index: usize) -> Option<&ProgressState> {
        self.progress.get(index)
    }

    pub fn logs(&self) -> &[LogEvent] {
        &self.logs
    }

    pub fn summary(&self) -> Option<&PipelineReport> {
        self.summary.as_ref()
    }

    /// Number of events applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Applies one event to the view
    ///
    /// Returns false if the event was ignored because the aggregator had
    /// already reached `Done`.
    pub fn apply(&mut self, event: &PipelineEvent) -> bool {
        match self.state {
            AggregatorState::Done => {
                tracing::warn!("Event received after completion, ignoring: {:?}", event);
                return false;
            }
            AggregatorState::Idle => self.state = AggregatorState::Running,
            AggregatorState::Running => {}
        }

        match event {
            PipelineEvent::Log(log) => self.logs.push(log.clone()),
            PipelineEvent::Progress {
                index,
                delta,
                total,
            } => match self.progress.get_mut(*index) {
                Some(slot) => slot.apply(*delta, *total),
                None => tracing::warn!("Progress event for unknown language index {}", index),
            },
            PipelineEvent::Summary(report) => self.summary = Some((**report).clone()),
            PipelineEvent::Done => self.state = AggregatorState::Done,
        }

        self.applied += 1;
        true
    }

    /// Drains the channel until the completion sentinel or until every
    /// producer has gone away
    ///
    /// `observer` is called after each applied event with the updated view.
    pub async fn run<F>(mut self, mut events: mpsc::Receiver<PipelineEvent>, mut observer: F) -> Self
    where
        F: FnMut(&ProgressAggregator, &PipelineEvent),
    {
        while let Some(event) = events.recv().await {
            if self.apply(&event) {
                observer(&self, &event);
            }
            if self.state == AggregatorState::Done {
                break;
            }
        }

        if self.state != AggregatorState::Done {
            tracing::debug!("Event channel closed before completion sentinel");
        }

        self
    }

    /// Renders one progress bar per language
    pub fn render_progress(&self) -> String {
        let mut out = String::new();
        for (label, state) in self.labels.iter().zip(&self.progress) {
            let filled = (state.ratio() * BAR_WIDTH as f64).round() as usize;
            out.push_str(&format!(
                "{:<3} [{}{}] {}/{}\n",
                label,
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled),
                state.completed,
                state.total
            ));
        }
        out
    }

    /// Renders the last `max_lines` log lines followed by the progress bars
    pub fn render(&self, max_lines: usize) -> String {
        let start = self.logs.len().saturating_sub(max_lines);
        let mut out = String::new();
        for log in &self.logs[start..] {
            out.push_str(&log.to_string());
            out.push('\n');
        }
        out.push_str(&self.render_progress());
        out
    }
}
