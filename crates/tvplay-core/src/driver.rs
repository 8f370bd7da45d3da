//! Player Driver - owns the playback primitive of one session
//!
//! Coordinates:
//! - Source selection, primitive setup and the load timeout
//! - Play/pause, debounced seeks and resume-after-seek
//! - Retry with the alternate source
//! - Status events from the primitive
//! - Progress ticks, checkpoints and resume from a saved position
//!
//! Every state change goes through the session's [`PlaybackReducer`]. Faults
//! from the primitive are recorded as the state's `error`, never returned.

use crate::{
    config::PlayerConfig,
    position::PositionStore,
    primitive::{PlaybackPrimitive, PrimitiveOptions, StatusListener, SubscriptionId},
    seek::{SeekDebouncer, SeekMode},
    state::{PlaybackReducer, PlaybackUpdate},
    timer::{TimerKind, TimerSet},
    types::{ContentSource, FormFactor, PlaybackState, PrimitiveStatus, SourceKind, StatusEvent},
    Error,
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Drives one playback primitive for one session
pub struct PlayerDriver<P: PlaybackPrimitive> {
    primitive: P,
    content: ContentSource,
    form_factor: FormFactor,
    config: PlayerConfig,
    reducer: PlaybackReducer,
    positions: PositionStore,
    debouncer: SeekDebouncer,
    timers: TimerSet,
    /// Source currently loaded into the primitive
    active_source: Option<SourceKind>,
    /// The primitive accepted a source at least once
    initialized: bool,
    subscription: Option<SubscriptionId>,
    /// Saved position waiting for the settle delay
    saved_resume: Option<f64>,
    /// Saved position lookup already done for the loaded source
    resume_checked: bool,
    torn_down: bool,
}

impl<P: PlaybackPrimitive> PlayerDriver<P> {
    /// Create a driver, nothing is sent to the primitive yet
    ///
    /// A configuration that fails [`PlayerConfig::validate`] is replaced by
    /// the defaults, zero intervals would stall the timers.
    pub fn new(
        primitive: P,
        content: ContentSource,
        form_factor: FormFactor,
        config: PlayerConfig,
        positions: PositionStore,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, video_id = %content.video_id, "Invalid player config, using defaults");
                PlayerConfig::default()
            }
        };
        let debouncer = SeekDebouncer::new(&config);
        Self {
            primitive,
            content,
            form_factor,
            config,
            reducer: PlaybackReducer::new(),
            positions,
            debouncer,
            timers: TimerSet::new(),
            active_source: None,
            initialized: false,
            subscription: None,
            saved_resume: None,
            resume_checked: false,
            torn_down: false,
        }
    }

    /// Current playback state
    pub fn state(&self) -> &PlaybackState {
        self.reducer.state()
    }

    /// Subscribe to playback state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.reducer.subscribe()
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn content(&self) -> &ContentSource {
        &self.content
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn active_source(&self) -> Option<SourceKind> {
        self.active_source
    }

    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    pub(crate) fn timers_mut(&mut self) -> &mut TimerSet {
        &mut self.timers
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Route primitive status events into `listener`
    pub fn attach(&mut self, listener: StatusListener) {
        if self.torn_down {
            return;
        }
        if let Some(previous) = self.subscription.take() {
            self.primitive.unsubscribe(previous);
        }
        self.subscription = Some(self.primitive.subscribe(listener));
    }

    fn update(&mut self, partial: PlaybackUpdate) {
        self.reducer.update(partial);
    }

    /// Record a fault as the visible error and stop loading
    fn fail(&mut self, err: Error) {
        warn!(code = err.error_code(), error = ?err, video_id = %self.content.video_id, "Playback fault");
        self.update(PlaybackUpdate::new().loading(false).error(err.to_string()));
    }

    /// Select the preferred source and hand it to the primitive
    ///
    /// TV form factors load the HLS URL, everything else the direct URL. A
    /// blank or unparseable preferred URL records `MissingSource` and does
    /// nothing else.
    pub fn initialize(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }

        let kind = ContentSource::preferred_kind(self.form_factor);
        let Some(url) = self.content.url_for(kind) else {
            self.fail(Error::MissingSource);
            return;
        };

        info!(video_id = %self.content.video_id, source = %kind, url = %url, "Initializing playback");

        if let Err(e) = self.primitive.initialize(&url, PrimitiveOptions::default()) {
            self.fail(Error::ConfigurationFailure(e.message));
            return;
        }

        self.active_source = Some(kind);
        self.initialized = true;
        self.resume_checked = false;
        self.timers
            .schedule(TimerKind::LoadTimeout, now + self.config.load_timeout());
        self.timers
            .schedule(TimerKind::ProgressTick, now + self.config.progress_interval());
    }

    /// Toggle playback
    pub fn play_pause(&mut self) {
        if self.torn_down {
            return;
        }

        // An explicit toggle overrides any resume owed by a seek
        self.timers.cancel(TimerKind::SeekResume);
        self.debouncer.forget_resume();

        let was_playing = self.state().is_playing;
        let result = if was_playing {
            self.primitive.pause()
        } else {
            self.primitive.play()
        };

        match result {
            Ok(()) => {
                debug!(playing = !was_playing, "Playback toggled");
                self.update(PlaybackUpdate::new().playing(!was_playing));
            }
            Err(e) => self.fail(Error::PlaybackControlFailure(e.message)),
        }
    }

    /// Seek with pause and resume (discrete jumps)
    ///
    /// The caller clamps `position` to `[0, duration]`.
    pub fn seek(&mut self, position: f64, now: Instant) {
        self.request_seek(position, SeekMode::Jump, now);
    }

    /// Plain debounced seek for continuous scrubbing, no auto-resume
    pub fn scrub(&mut self, position: f64, now: Instant) {
        self.request_seek(position, SeekMode::Scrub, now);
    }

    /// Jump forward one step, clamped at the duration when known
    pub fn seek_forward(&mut self, now: Instant) {
        let state = self.state();
        let mut target = state.current_time + self.config.seek_step_secs;
        if state.duration > 0.0 {
            target = target.min(state.duration);
        }
        self.seek(target, now);
    }

    /// Jump back one step, clamped at zero
    pub fn seek_backward(&mut self, now: Instant) {
        let target = (self.state().current_time - self.config.seek_step_secs).max(0.0);
        self.seek(target, now);
    }

    fn request_seek(&mut self, position: f64, mode: SeekMode, now: Instant) {
        if self.torn_down {
            return;
        }

        // An explicit seek wins over a pending saved position
        if self.timers.cancel(TimerKind::SavedResume) {
            self.saved_resume = None;
        }

        // A resume still owed by the previous burst carries into this one
        let resume_owed = self.timers.cancel(TimerKind::SeekResume);
        let playing = self.state().is_playing;
        let request = self.debouncer.request(position, mode, playing, now);
        if resume_owed {
            self.debouncer.owe_resume();
        }

        if request.pause {
            if let Err(e) = self.primitive.pause() {
                self.debouncer.cancel();
                self.fail(Error::SeekFailure(e.message));
                return;
            }
            self.update(PlaybackUpdate::new().playing(false));
        }

        self.update(PlaybackUpdate::new().current_time(position));
        self.timers.schedule(TimerKind::SeekCommit, request.commit_at);
    }

    fn commit_seek(&mut self, now: Instant) {
        let Some(commit) = self.debouncer.commit() else {
            return;
        };

        if let Err(e) = self.primitive.set_current_time(commit.position) {
            self.fail(Error::SeekFailure(e.message));
            return;
        }

        debug!(position = commit.position, resume = commit.resume, "Seek committed");
        self.positions.save(&self.content.video_id, commit.position);

        if commit.resume {
            self.timers
                .schedule(TimerKind::SeekResume, now + self.debouncer.resume_delay());
        }
    }

    fn resume_after_seek(&mut self) {
        match self.primitive.play() {
            Ok(()) => self.update(PlaybackUpdate::new().playing(true)),
            Err(e) => self.fail(Error::PlaybackControlFailure(e.message)),
        }
    }

    /// Clear the error and reload with the other source
    ///
    /// Falls back to the current source when the other one is unusable.
    pub fn retry(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }

        self.update(
            PlaybackUpdate::new()
                .clear_error()
                .current_time(0.0)
                .playing(false)
                .loading(true),
        );
        self.debouncer.cancel();
        for kind in [
            TimerKind::SeekCommit,
            TimerKind::SeekResume,
            TimerKind::SavedResume,
            TimerKind::LoadTimeout,
        ] {
            self.timers.cancel(kind);
        }
        self.saved_resume = None;

        let current = self
            .active_source
            .unwrap_or_else(|| ContentSource::preferred_kind(self.form_factor));
        let candidate = [current.other(), current]
            .into_iter()
            .find_map(|kind| self.content.url_for(kind).map(|url| (kind, url)));

        let Some((kind, url)) = candidate else {
            self.fail(Error::RetryFailure("no usable source".into()));
            return;
        };

        info!(video_id = %self.content.video_id, from = %current, to = %kind, "Retrying playback");

        let result = if self.initialized {
            self.primitive.replace_source(&url)
        } else {
            self.primitive.initialize(&url, PrimitiveOptions::default())
        };
        if let Err(e) = result {
            self.fail(Error::RetryFailure(e.message));
            return;
        }

        self.active_source = Some(kind);
        self.initialized = true;
        self.resume_checked = false;
        self.timers
            .schedule(TimerKind::LoadTimeout, now + self.config.load_timeout());
        if !self.timers.is_pending(TimerKind::ProgressTick) {
            self.timers
                .schedule(TimerKind::ProgressTick, now + self.config.progress_interval());
        }
    }

    /// Apply a `statusChange` notification from the primitive
    ///
    /// Repeated notifications of the same status leave the state unchanged.
    pub fn handle_status(&mut self, event: &StatusEvent, now: Instant) {
        if self.torn_down {
            return;
        }
        debug!(status = %event.status, "Primitive status");

        match &event.status {
            PrimitiveStatus::Idle => {
                self.update(PlaybackUpdate::new().loading(false).clear_error().playing(false));
            }
            PrimitiveStatus::Loading => {
                let state = self.state();
                // Only retry or idle leave the error state
                if state.has_error() {
                    return;
                }
                // Minor buffering mid-playback must not flash the spinner
                if state.current_time == 0.0 || !state.is_playing {
                    self.update(PlaybackUpdate::new().loading(true));
                }
            }
            PrimitiveStatus::ReadyToPlay => {
                self.timers.cancel(TimerKind::LoadTimeout);
                let duration = self.primitive.duration();
                self.update(
                    PlaybackUpdate::new()
                        .loading(false)
                        .clear_error()
                        .duration(duration),
                );
                self.schedule_saved_resume(now);
            }
            PrimitiveStatus::Error => {
                let message = event
                    .error
                    .as_ref()
                    .and_then(|payload| payload.message())
                    .map(str::to_string);
                self.fail(Error::playback(message));
                self.update(PlaybackUpdate::new().playing(false));
            }
            PrimitiveStatus::Other(_) => {
                let mut refresh = PlaybackUpdate::new()
                    .playing(self.primitive.playing())
                    .duration(self.primitive.duration());
                if !self.debouncer.is_pending() {
                    refresh = refresh.current_time(self.primitive.current_time());
                }
                self.update(refresh);
            }
        }
    }

    fn schedule_saved_resume(&mut self, now: Instant) {
        if self.resume_checked {
            return;
        }
        self.resume_checked = true;

        let saved = self.positions.get(&self.content.video_id);
        if saved > 0.0 {
            info!(video_id = %self.content.video_id, position = saved, "Resuming from saved position");
            self.saved_resume = Some(saved);
            self.timers
                .schedule(TimerKind::SavedResume, now + self.config.saved_resume_delay());
        }
    }

    /// Move the primitive to the saved position, playback state untouched
    fn apply_saved_resume(&mut self) {
        let Some(position) = self.saved_resume.take() else {
            return;
        };
        if let Err(e) = self.primitive.set_current_time(position) {
            self.fail(Error::SeekFailure(e.message));
            return;
        }
        self.update(PlaybackUpdate::new().current_time(position));
    }

    /// Refresh the position while playing and checkpoint every few seconds
    fn progress_tick(&mut self, now: Instant) {
        self.timers
            .schedule(TimerKind::ProgressTick, now + self.config.progress_interval());

        if !self.state().is_playing || self.debouncer.is_pending() {
            return;
        }

        let current_time = self.primitive.current_time();
        self.update(PlaybackUpdate::new().current_time(current_time));

        let whole_seconds = current_time.max(0.0).floor() as u64;
        if whole_seconds % self.config.checkpoint_every_secs == 0 {
            self.positions.save(&self.content.video_id, current_time);
        }
    }

    fn load_timed_out(&mut self) {
        if self.state().is_loading {
            self.fail(Error::LoadTimeout);
        }
    }

    /// Run the handler of a fired timer
    ///
    /// Returns false for kinds the driver does not own.
    pub fn on_timer(&mut self, kind: TimerKind, now: Instant) -> bool {
        if self.torn_down {
            return true;
        }
        match kind {
            TimerKind::LoadTimeout => self.load_timed_out(),
            TimerKind::SeekCommit => self.commit_seek(now),
            TimerKind::SeekResume => self.resume_after_seek(),
            TimerKind::SavedResume => self.apply_saved_resume(),
            TimerKind::ProgressTick => self.progress_tick(now),
            TimerKind::ControlsHide => return false,
        }
        true
    }

    /// Fire every driver timer due at `now`
    pub fn advance(&mut self, now: Instant) {
        while let Some(kind) = self.timers.pop_due(now) {
            self.on_timer(kind, now);
        }
    }

    /// Cancel all timers and detach from the primitive
    ///
    /// Idempotent, also run on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timers.clear();
        self.debouncer.cancel();
        self.saved_resume = None;
        if let Some(id) = self.subscription.take() {
            self.primitive.unsubscribe(id);
        }
        self.torn_down = true;
        debug!(video_id = %self.content.video_id, "Driver torn down");
    }
}

impl<P: PlaybackPrimitive> Drop for PlayerDriver<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
