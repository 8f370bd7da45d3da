//! Owned set of cancelable timers
//!
//! A session keeps every pending deadline here instead of scattering handles
//! across components. Scheduling a kind that is already pending replaces it
//! (latest wins), and [`TimerSet::clear`] releases everything at teardown.

use std::collections::HashMap;
use tokio::time::Instant;

/// Timers a session can have pending, at most one of each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Give up if the primitive is still loading
    LoadTimeout,
    /// Commit the debounced seek
    SeekCommit,
    /// Resume playback after a committed seek
    SeekResume,
    /// Apply the saved position once the primitive settled
    SavedResume,
    /// Hide the on-screen controls
    ControlsHide,
    /// Refresh position and checkpoint
    ProgressTick,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimerKind::LoadTimeout => "load_timeout",
            TimerKind::SeekCommit => "seek_commit",
            TimerKind::SeekResume => "seek_resume",
            TimerKind::SavedResume => "saved_resume",
            TimerKind::ControlsHide => "controls_hide",
            TimerKind::ProgressTick => "progress_tick",
        };
        write!(f, "{}", name)
    }
}

/// Pending deadlines keyed by timer kind
#[derive(Debug, Default)]
pub struct TimerSet {
    deadlines: HashMap<TimerKind, Instant>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer, replacing any pending deadline of the same kind
    pub fn schedule(&mut self, kind: TimerKind, at: Instant) {
        self.deadlines.insert(kind, at);
    }

    /// Disarm a timer, returns true if it was pending
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines.remove(&kind).is_some()
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.deadlines.get(&kind).copied()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return the earliest timer due at `now`
    ///
    /// Ties break on [`TimerKind`] order so firing is deterministic.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerKind> {
        let kind = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .min_by_key(|(kind, at)| (**at, **kind))
            .map(|(kind, _)| *kind)?;
        self.deadlines.remove(&kind);
        Some(kind)
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Cancel every pending timer
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}
