//! Session event loop
//!
//! Remote input, primitive status callbacks and timer deadlines arrive from
//! independent sources. The runner owns the session and applies them one at a
//! time, so the reducer never sees concurrent updates.

use crate::{
    navigation::{RemoteEvent, RemoteKey},
    primitive::PlaybackPrimitive,
    session::{CloseReason, PlayerSession, SessionSnapshot},
    types::StatusEvent,
    Error, Result,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Input accepted by a running session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Remote(RemoteEvent),
    /// Platform hardware back channel
    HardwareBack,
    /// Continuous scrub to an absolute position (seconds)
    Scrub(f64),
    Retry,
    Close,
}

/// Final report of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub reason: CloseReason,
    pub snapshot: SessionSnapshot,
}

/// Sender side for feeding a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionInput>,
}

impl SessionHandle {
    pub async fn send(&self, input: SessionInput) -> Result<()> {
        self.tx.send(input).await.map_err(|_| Error::SessionClosed)
    }

    /// Send a key press
    pub async fn press(&self, key: RemoteKey) -> Result<()> {
        self.send(SessionInput::Remote(RemoteEvent::press(key))).await
    }

    pub async fn hardware_back(&self) -> Result<()> {
        self.send(SessionInput::HardwareBack).await
    }

    pub async fn close(&self) -> Result<()> {
        self.send(SessionInput::Close).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owns a session and drives it from its event sources
pub struct SessionRunner<P: PlaybackPrimitive> {
    session: PlayerSession<P>,
    inputs: mpsc::Receiver<SessionInput>,
    status_rx: mpsc::UnboundedReceiver<StatusEvent>,
}

impl<P: PlaybackPrimitive> SessionRunner<P> {
    /// Open the session and return the runner with its input handle
    pub fn open(mut session: PlayerSession<P>) -> (Self, SessionHandle) {
        let (tx, inputs) = mpsc::channel(64);
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        session.open(Some(status_tx), Instant::now());

        let runner = Self {
            session,
            inputs,
            status_rx,
        };
        (runner, SessionHandle { tx })
    }

    pub fn session(&self) -> &PlayerSession<P> {
        &self.session
    }

    fn apply(&mut self, input: SessionInput) {
        let now = Instant::now();
        match input {
            SessionInput::Remote(event) => self.session.handle_remote(&event, now),
            SessionInput::HardwareBack => self.session.handle_hardware_back(),
            SessionInput::Scrub(position) => self.session.scrub_to(position, now),
            SessionInput::Retry => self.session.retry(now),
            SessionInput::Close => self.session.close(CloseReason::Command),
        }
    }

    /// Run until the session closes
    ///
    /// Dropping every [`SessionHandle`] closes the session. Teardown runs on
    /// every exit path, including cancellation of this future.
    pub async fn run(mut self) -> SessionOutcome {
        info!(session_id = %self.session.id(), "Session loop started");

        let reason = loop {
            if let Some(reason) = self.session.closed() {
                break reason;
            }

            let deadline = self.session.next_deadline();
            tokio::select! {
                biased;

                input = self.inputs.recv() => match input {
                    Some(input) => {
                        debug!(?input, "Session input");
                        self.apply(input);
                    }
                    None => self.session.close(CloseReason::InputsDropped),
                },
                Some(status) = self.status_rx.recv() => {
                    self.session.handle_status(&status, Instant::now());
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.session.advance(Instant::now());
                }
            }
        };

        SessionOutcome {
            reason,
            snapshot: self.session.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::navigation::FocusTarget;
    use crate::position::PositionStore;
    use crate::sim::SimulatedPrimitive;
    use crate::types::{ContentSource, FormFactor, PrimitiveStatus};
    use std::time::Duration;
    use tokio::time::sleep;

    fn runner() -> (SessionRunner<SimulatedPrimitive>, SessionHandle, SimulatedPrimitive) {
        let sim = SimulatedPrimitive::with_duration(200.0);
        let session = PlayerSession::new(
            sim.clone(),
            ContentSource::new("v9", "https://cdn.example/v9.mp4", ""),
            FormFactor::Handheld,
            PlayerConfig::default(),
            PositionStore::new(),
        );
        let (runner, handle) = SessionRunner::open(session);
        (runner, handle, sim)
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_events_flow_through_listener() {
        let (runner, handle, sim) = runner();
        let task = tokio::spawn(runner.run());

        sim.emit_status(PrimitiveStatus::ReadyToPlay);
        handle.press(RemoteKey::Select).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        assert!(sim.playing());

        handle.close().await.unwrap();
        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, CloseReason::Command);
        assert!(outcome.snapshot.playback.is_playing);
        assert_eq!(outcome.snapshot.playback.duration, 200.0);
        assert_eq!(sim.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout_fires_in_loop() {
        let (runner, handle, _sim) = runner();
        let task = tokio::spawn(runner.run());

        sleep(Duration::from_secs(31)).await;
        handle.hardware_back().await.unwrap();

        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, CloseReason::HardwareBack);
        assert_eq!(
            outcome.snapshot.playback.error.as_deref(),
            Some("Video took too long to load. Please try again.")
        );
        assert!(!outcome.snapshot.playback.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_scrub_commits_once() {
        let (runner, handle, sim) = runner();
        let task = tokio::spawn(runner.run());
        sim.emit_status(PrimitiveStatus::ReadyToPlay);

        handle.send(SessionInput::Scrub(10.0)).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        handle.send(SessionInput::Scrub(20.0)).await.unwrap();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(sim.seeks(), vec![20.0]);
        drop(handle);
        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, CloseReason::InputsDropped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_moves_in_loop() {
        let (runner, handle, _sim) = runner();
        let task = tokio::spawn(runner.run());

        handle.press(RemoteKey::Left).await.unwrap();
        handle.press(RemoteKey::Left).await.unwrap();
        sleep(Duration::from_secs(4)).await;
        handle.close().await.unwrap();

        let outcome = task.await.unwrap();
        assert_eq!(outcome.snapshot.focus, FocusTarget::Back);
        assert!(!outcome.snapshot.controls_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_closes() {
        let (runner, handle, _sim) = runner();
        let task = tokio::spawn(runner.run());
        handle.press(RemoteKey::Menu).await.unwrap();
        let outcome = task.await.unwrap();
        assert_eq!(outcome.reason, CloseReason::Remote);
    }
}
