//! Playback state reducer
//!
//! Every mutation of a session's [`PlaybackState`] goes through
//! [`PlaybackReducer::update`], so user commands, timer firings and primitive
//! callbacks are applied one after another on a single owner.

use crate::types::PlaybackState;
use tokio::sync::watch;

/// Partial playback state, only `Some` fields are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackUpdate {
    pub is_playing: Option<bool>,
    pub current_time: Option<f64>,
    pub duration: Option<f64>,
    pub is_loading: Option<bool>,
    /// `Some(None)` clears the error
    pub error: Option<Option<String>>,
}

impl PlaybackUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(mut self, is_playing: bool) -> Self {
        self.is_playing = Some(is_playing);
        self
    }

    pub fn current_time(mut self, seconds: f64) -> Self {
        self.current_time = Some(seconds);
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn loading(mut self, is_loading: bool) -> Self {
        self.is_loading = Some(is_loading);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(Some(message.into()));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Owner of one session's playback state
#[derive(Debug)]
pub struct PlaybackReducer {
    state: PlaybackState,
    state_tx: watch::Sender<PlaybackState>,
}

impl PlaybackReducer {
    /// Create a reducer in the initial loading state
    pub fn new() -> Self {
        Self::with_state(PlaybackState::loading())
    }

    pub fn with_state(state: PlaybackState) -> Self {
        let (state_tx, _) = watch::channel(state.clone());
        Self { state, state_tx }
    }

    /// Current state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Shallow-merge a partial update, returns true if anything changed
    ///
    /// No validation is applied, callers keep `current_time <= duration`.
    pub fn update(&mut self, partial: PlaybackUpdate) -> bool {
        let before = self.state.clone();

        if let Some(is_playing) = partial.is_playing {
            self.state.is_playing = is_playing;
        }
        if let Some(current_time) = partial.current_time {
            self.state.current_time = current_time;
        }
        if let Some(duration) = partial.duration {
            self.state.duration = duration;
        }
        if let Some(is_loading) = partial.is_loading {
            self.state.is_loading = is_loading;
        }
        if let Some(error) = partial.error {
            self.state.error = error;
        }

        let changed = before != self.state;
        if changed {
            self.state_tx.send_replace(self.state.clone());
        }
        changed
    }
}

impl Default for PlaybackReducer {
    fn default() -> Self {
        Self::new()
    }
}
