//! Player Session - one open full-screen player
//!
//! Ties together:
//! - The [`PlayerDriver`] and its primitive
//! - Remote focus navigation
//! - Controls auto-hide
//! - Guaranteed teardown on close or drop
//!
//! Sessions are explicit values, so any number can coexist in one process.

use crate::{
    config::PlayerConfig,
    driver::PlayerDriver,
    navigation::{self, FocusTarget, NavAction, RemoteEvent},
    position::PositionStore,
    primitive::{PlaybackPrimitive, StatusListener},
    timer::TimerKind,
    types::{ContentSource, FormFactor, PlaybackState, SessionId, SourceKind, StatusEvent},
};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Back control, menu or back key on the remote
    Remote,
    /// Platform hardware back button
    HardwareBack,
    /// Closed by the embedding application
    Command,
    /// Every input source went away
    InputsDropped,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::Remote => write!(f, "remote"),
            CloseReason::HardwareBack => write!(f, "hardware_back"),
            CloseReason::Command => write!(f, "command"),
            CloseReason::InputsDropped => write!(f, "inputs_dropped"),
        }
    }
}

/// Serializable view of a session for rendering or reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub video_id: String,
    pub playback: PlaybackState,
    pub focus: FocusTarget,
    pub controls_visible: bool,
    pub active_source: Option<SourceKind>,
    pub closed: Option<CloseReason>,
}

/// A single playback session
pub struct PlayerSession<P: PlaybackPrimitive> {
    id: SessionId,
    driver: PlayerDriver<P>,
    focus: FocusTarget,
    controls_visible: bool,
    closed: Option<CloseReason>,
}

impl<P: PlaybackPrimitive> PlayerSession<P> {
    /// Create a session, nothing is sent to the primitive until [`open`](Self::open)
    pub fn new(
        primitive: P,
        content: ContentSource,
        form_factor: FormFactor,
        config: PlayerConfig,
        positions: PositionStore,
    ) -> Self {
        Self {
            id: SessionId::new(),
            driver: PlayerDriver::new(primitive, content, form_factor, config, positions),
            focus: FocusTarget::None,
            controls_visible: false,
            closed: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn closed(&self) -> Option<CloseReason> {
        self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    pub fn state(&self) -> &PlaybackState {
        self.driver.state()
    }

    /// Subscribe to playback state changes
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.driver.subscribe_state()
    }

    pub fn driver(&self) -> &PlayerDriver<P> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PlayerDriver<P> {
        &mut self.driver
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            video_id: self.driver.content().video_id.clone(),
            playback: self.driver.state().clone(),
            focus: self.focus,
            controls_visible: self.controls_visible,
            active_source: self.driver.active_source(),
            closed: self.closed,
        }
    }

    /// Open the player: attach the listener, load the source, focus play/pause
    #[instrument(skip(self, listener), fields(session_id = %self.id))]
    pub fn open(&mut self, listener: Option<StatusListener>, now: Instant) {
        if self.is_closed() {
            return;
        }
        info!(video_id = %self.driver.content().video_id, "Opening player");
        if let Some(listener) = listener {
            self.driver.attach(listener);
        }
        self.driver.initialize(now);
        self.focus = FocusTarget::INITIAL;
        self.show_controls(now);
    }

    /// Show the controls and restart the auto-hide window
    fn show_controls(&mut self, now: Instant) {
        self.controls_visible = true;
        let hide_at = now + self.driver.config().controls_hide();
        self.driver
            .timers_mut()
            .schedule(TimerKind::ControlsHide, hide_at);
    }

    /// Feed one remote-control event
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn handle_remote(&mut self, event: &RemoteEvent, now: Instant) {
        if self.is_closed() {
            return;
        }

        let transition = if self.state().has_error() {
            navigation::error_transition(self.focus, event)
        } else {
            navigation::transition(self.focus, event)
        };

        if transition.focus != self.focus {
            debug!(from = %self.focus, to = %transition.focus, "Focus moved");
        }
        self.focus = transition.focus;
        if transition.restart_hide {
            self.show_controls(now);
        }

        match transition.action {
            NavAction::None => {}
            NavAction::Close => self.close(CloseReason::Remote),
            NavAction::TogglePlayPause => self.driver.play_pause(),
            NavAction::SeekBackward => self.driver.seek_backward(now),
            NavAction::SeekForward => self.driver.seek_forward(now),
            NavAction::Retry => self.driver.retry(now),
        }
    }

    /// Hardware back always closes, whatever the focus
    pub fn handle_hardware_back(&mut self) {
        self.close(CloseReason::HardwareBack);
    }

    /// Feed one primitive status notification
    pub fn handle_status(&mut self, event: &StatusEvent, now: Instant) {
        if self.is_closed() {
            return;
        }
        self.driver.handle_status(event, now);
    }

    /// Continuous scrub to an absolute position, clamped to the media
    pub fn scrub_to(&mut self, position: f64, now: Instant) {
        if self.is_closed() {
            return;
        }
        let duration = self.state().duration;
        let clamped = if duration > 0.0 {
            position.clamp(0.0, duration)
        } else {
            position.max(0.0)
        };
        self.show_controls(now);
        self.driver.scrub(clamped, now);
    }

    /// Retry playback with the alternate source
    pub fn retry(&mut self, now: Instant) {
        if self.is_closed() {
            return;
        }
        self.driver.retry(now);
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.driver.timers().next_deadline()
    }

    /// Fire every timer due at `now` in deadline order
    pub fn advance(&mut self, now: Instant) {
        while let Some(kind) = self.driver.timers_mut().pop_due(now) {
            if !self.driver.on_timer(kind, now) && kind == TimerKind::ControlsHide {
                self.controls_visible = false;
            }
        }
    }

    /// End the session and release every timer and subscription
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn close(&mut self, reason: CloseReason) {
        if self.is_closed() {
            return;
        }
        self.driver.teardown();
        self.controls_visible = false;
        self.closed = Some(reason);
        info!(%reason, "Session closed");
    }
}

impl<P: PlaybackPrimitive> std::fmt::Debug for PlayerSession<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("id", &self.id)
            .field("focus", &self.focus)
            .field("controls_visible", &self.controls_visible)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RemoteKey;
    use crate::sim::{PrimitiveCommand, SimulatedPrimitive};
    use crate::types::PrimitiveStatus;
    use std::time::Duration;

    fn open_session() -> (PlayerSession<SimulatedPrimitive>, SimulatedPrimitive, Instant) {
        let sim = SimulatedPrimitive::with_duration(300.0);
        let mut session = PlayerSession::new(
            sim.clone(),
            ContentSource::new("v1", "https://cdn.example/v1.mp4", "https://cdn.example/v1.m3u8"),
            FormFactor::Tv,
            PlayerConfig::default(),
            PositionStore::new(),
        );
        let now = Instant::now();
        session.open(None, now);
        session.handle_status(&StatusEvent::new(PrimitiveStatus::ReadyToPlay), now);
        sim.clear_commands();
        (session, sim, now)
    }

    fn press(session: &mut PlayerSession<SimulatedPrimitive>, key: RemoteKey, now: Instant) {
        session.handle_remote(&RemoteEvent::press(key), now);
    }

    #[test]
    fn test_open_focuses_play_pause() {
        let (session, _, _) = open_session();
        assert_eq!(session.focus(), FocusTarget::PlayPause);
        assert!(session.controls_visible());
    }

    #[test]
    fn test_select_on_play_pause_toggles() {
        let (mut session, sim, now) = open_session();
        press(&mut session, RemoteKey::Select, now);
        assert!(session.state().is_playing);
        assert_eq!(sim.commands(), vec![PrimitiveCommand::Play]);
    }

    #[test]
    fn test_progress_left_seeks_immediately() {
        let (mut session, sim, now) = open_session();
        session.driver_mut().seek(100.0, now);
        session.advance(now + Duration::from_millis(200));
        sim.clear_commands();

        press(&mut session, RemoteKey::Down, now);
        assert_eq!(session.focus(), FocusTarget::Progress);
        press(&mut session, RemoteKey::Left, now);
        assert_eq!(session.focus(), FocusTarget::Progress);
        assert_eq!(session.state().current_time, 90.0);

        session.advance(now + Duration::from_millis(100));
        assert_eq!(sim.seeks(), vec![90.0]);
    }

    #[test]
    fn test_controls_hide_after_inactivity() {
        let (mut session, _, now) = open_session();
        session.advance(now + Duration::from_millis(2999));
        assert!(session.controls_visible());

        // Any press restarts the window
        press(&mut session, RemoteKey::Other("info".into()), now + Duration::from_secs(2));
        session.advance(now + Duration::from_millis(4999));
        assert!(session.controls_visible());

        session.advance(now + Duration::from_secs(5));
        assert!(!session.controls_visible());
    }

    #[test]
    fn test_release_does_not_restart_hide() {
        let (mut session, _, now) = open_session();
        session.handle_remote(
            &RemoteEvent::release(RemoteKey::Left),
            now + Duration::from_secs(2),
        );
        assert_eq!(session.focus(), FocusTarget::PlayPause);
        session.advance(now + Duration::from_secs(3));
        assert!(!session.controls_visible());
    }

    #[test]
    fn test_back_control_closes() {
        let (mut session, sim, now) = open_session();
        press(&mut session, RemoteKey::Up, now);
        assert_eq!(session.focus(), FocusTarget::Back);
        press(&mut session, RemoteKey::Select, now);
        assert_eq!(session.closed(), Some(CloseReason::Remote));
        assert!(session.next_deadline().is_none());

        // Closed sessions ignore input
        press(&mut session, RemoteKey::Select, now);
        assert!(sim.commands().is_empty());
    }

    #[test]
    fn test_hardware_back_closes_from_any_focus() {
        let (mut session, _, now) = open_session();
        press(&mut session, RemoteKey::Down, now);
        session.handle_hardware_back();
        assert_eq!(session.closed(), Some(CloseReason::HardwareBack));
        assert!(!session.controls_visible());
    }

    #[test]
    fn test_select_retries_in_error_state() {
        let (mut session, sim, now) = open_session();
        press(&mut session, RemoteKey::Right, now);
        session.handle_status(&StatusEvent::error(None), now);

        press(&mut session, RemoteKey::Left, now);
        assert_eq!(session.focus(), FocusTarget::SeekForward);

        press(&mut session, RemoteKey::Select, now);
        assert!(session.state().error.is_none());
        assert!(session.state().is_loading);
        assert_eq!(
            sim.commands(),
            vec![PrimitiveCommand::ReplaceSource {
                source: "https://cdn.example/v1.mp4".into()
            }]
        );
    }

    #[test]
    fn test_scrub_clamps_to_duration() {
        let (mut session, sim, now) = open_session();
        session.scrub_to(500.0, now);
        session.advance(now + Duration::from_millis(300));
        assert_eq!(sim.seeks(), vec![300.0]);
    }

    #[test]
    fn test_snapshot() {
        let (session, _, _) = open_session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.video_id, "v1");
        assert_eq!(snapshot.active_source, Some(SourceKind::Hls));
        assert_eq!(snapshot.focus, FocusTarget::PlayPause);
        assert!(snapshot.closed.is_none());
    }
}
