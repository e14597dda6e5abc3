/// Completed/total counters for one language
///
/// Mutated only by the progress aggregator. `total` is announced once, before
/// any completions are reported, and is never lowered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: u64,
    pub total: u64,
}

impl ProgressState {
    /// Applies one `progress(delta, total)` event
    ///
    /// `delta` is added to `completed`. A non-zero `total` replaces the
    /// current total; a zero total leaves it untouched.
    pub fn apply(&mut self, delta: u64, total: u64) {
        if total > 0 {
            if total < self.total {
                tracing::warn!(
                    "Ignoring total {} lower than announced total {}",
                    total,
                    self.total
                );
            } else {
                self.total = total;
            }
        }
        self.completed = self.completed.saturating_add(delta);
    }

    /// Returns true once every announced item has been handled
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    /// Completion ratio in `0.0..=1.0`; an empty language counts as done
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.completed as f64 / self.total as f64).min(1.0)
        }
    }
}
