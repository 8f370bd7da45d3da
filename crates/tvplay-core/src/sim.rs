//! Simulated playback primitive
//!
//! An in-memory [`PlaybackPrimitive`] that records every command, can be told
//! to fail selected commands and emits scripted status sequences. Used by the
//! tests and by the CLI `simulate` command.

use crate::primitive::{
    PlaybackPrimitive, PrimitiveError, PrimitiveOptions, StatusListener, SubscriptionId,
};
use crate::types::{PrimitiveStatus, StatusEvent, StatusPayload};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// Command kinds that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Initialize,
    Play,
    Pause,
    SetCurrentTime,
    ReplaceSource,
}

/// A command received by the simulated primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PrimitiveCommand {
    Initialize { source: String, options_looping: bool },
    Play,
    Pause,
    SetCurrentTime { seconds: f64 },
    ReplaceSource { source: String },
}

#[derive(Debug, Default)]
struct SimInner {
    source: Option<Url>,
    options: Option<PrimitiveOptions>,
    playing: bool,
    current_time: f64,
    duration: f64,
    status: Option<PrimitiveStatus>,
    commands: Vec<PrimitiveCommand>,
    failing: HashSet<CommandKind>,
    listeners: Vec<(SubscriptionId, StatusListener)>,
    next_subscription: u64,
}

/// Shared handle onto a simulated primitive
///
/// Clones observe and control the same instance, so a test can keep a handle
/// after moving another into a session.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPrimitive {
    inner: Arc<Mutex<SimInner>>,
}

impl SimulatedPrimitive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a known media duration
    pub fn with_duration(duration: f64) -> Self {
        let sim = Self::new();
        sim.lock().duration = duration;
        sim
    }

    fn lock(&self) -> MutexGuard<'_, SimInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, kind: CommandKind) -> Result<(), PrimitiveError> {
        if self.lock().failing.contains(&kind) {
            return Err(PrimitiveError::new(format!("simulated {:?} failure", kind)));
        }
        Ok(())
    }

    /// Make a command kind fail until [`Self::succeed`] is called
    pub fn fail(&self, kind: CommandKind) {
        self.lock().failing.insert(kind);
    }

    pub fn succeed(&self, kind: CommandKind) {
        self.lock().failing.remove(&kind);
    }

    /// Every command received so far
    pub fn commands(&self) -> Vec<PrimitiveCommand> {
        self.lock().commands.clone()
    }

    /// Values passed to `set_current_time`, in order
    pub fn seeks(&self) -> Vec<f64> {
        self.lock()
            .commands
            .iter()
            .filter_map(|c| match c {
                PrimitiveCommand::SetCurrentTime { seconds } => Some(*seconds),
                _ => None,
            })
            .collect()
    }

    pub fn clear_commands(&self) {
        self.lock().commands.clear();
    }

    pub fn source(&self) -> Option<Url> {
        self.lock().source.clone()
    }

    pub fn options(&self) -> Option<PrimitiveOptions> {
        self.lock().options
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn set_duration(&self, duration: f64) {
        self.lock().duration = duration;
    }

    /// Move the live playhead without recording a command
    pub fn set_position(&self, seconds: f64) {
        self.lock().current_time = seconds;
    }

    /// Advance the playhead as if playing, clamped to the duration
    pub fn advance(&self, seconds: f64) {
        let mut inner = self.lock();
        if inner.playing {
            let next = inner.current_time + seconds;
            inner.current_time = if inner.duration > 0.0 {
                next.min(inner.duration)
            } else {
                next
            };
        }
    }

    /// Set the status and notify every subscriber
    pub fn emit(&self, event: StatusEvent) {
        let mut inner = self.lock();
        inner.status = Some(event.status.clone());
        if event.status == PrimitiveStatus::Error {
            inner.playing = false;
        }
        inner.listeners.retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn emit_status(&self, status: PrimitiveStatus) {
        self.emit(StatusEvent::new(status));
    }

    pub fn emit_error(&self, message: &str) {
        self.emit(StatusEvent::error(Some(StatusPayload::Text(message.to_string()))));
    }
}

impl PlaybackPrimitive for SimulatedPrimitive {
    fn initialize(&mut self, source: &Url, options: PrimitiveOptions) -> Result<(), PrimitiveError> {
        self.check(CommandKind::Initialize)?;
        let mut inner = self.lock();
        inner.commands.push(PrimitiveCommand::Initialize {
            source: source.to_string(),
            options_looping: options.looping,
        });
        inner.source = Some(source.clone());
        inner.options = Some(options);
        inner.current_time = 0.0;
        inner.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PrimitiveError> {
        self.check(CommandKind::Play)?;
        let mut inner = self.lock();
        inner.commands.push(PrimitiveCommand::Play);
        inner.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PrimitiveError> {
        self.check(CommandKind::Pause)?;
        let mut inner = self.lock();
        inner.commands.push(PrimitiveCommand::Pause);
        inner.playing = false;
        Ok(())
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), PrimitiveError> {
        self.check(CommandKind::SetCurrentTime)?;
        let mut inner = self.lock();
        inner.commands.push(PrimitiveCommand::SetCurrentTime { seconds });
        inner.current_time = seconds;
        Ok(())
    }

    fn replace_source(&mut self, source: &Url) -> Result<(), PrimitiveError> {
        self.check(CommandKind::ReplaceSource)?;
        let mut inner = self.lock();
        inner.commands.push(PrimitiveCommand::ReplaceSource {
            source: source.to_string(),
        });
        inner.source = Some(source.clone());
        inner.current_time = 0.0;
        inner.playing = false;
        Ok(())
    }

    fn playing(&self) -> bool {
        self.lock().playing
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn status(&self) -> PrimitiveStatus {
        self.lock().status.clone().unwrap_or(PrimitiveStatus::Idle)
    }

    fn subscribe(&mut self, listener: StatusListener) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.lock().listeners.retain(|(sub, _)| *sub != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_records_commands() {
        let mut sim = SimulatedPrimitive::with_duration(60.0);
        let url = Url::parse("https://cdn.example/a.mp4").unwrap();
        sim.initialize(&url, PrimitiveOptions::default()).unwrap();
        sim.play().unwrap();
        sim.set_current_time(12.0).unwrap();

        assert_eq!(sim.commands().len(), 3);
        assert_eq!(sim.seeks(), vec![12.0]);
        assert!(sim.playing());
        assert_eq!(sim.current_time(), 12.0);
    }

    #[test]
    fn test_injected_failure() {
        let mut sim = SimulatedPrimitive::new();
        sim.fail(CommandKind::Play);
        assert!(sim.play().is_err());
        assert!(sim.commands().is_empty());

        sim.succeed(CommandKind::Play);
        assert!(sim.play().is_ok());
    }

    #[test]
    fn test_emit_reaches_subscribers_until_unsubscribed() {
        let mut sim = SimulatedPrimitive::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = sim.subscribe(tx);

        sim.emit_status(PrimitiveStatus::Loading);
        assert_eq!(rx.try_recv().unwrap().status, PrimitiveStatus::Loading);

        sim.unsubscribe(id);
        sim.emit_status(PrimitiveStatus::ReadyToPlay);
        assert!(rx.try_recv().is_err());
        assert_eq!(sim.status(), PrimitiveStatus::ReadyToPlay);
    }

    #[test]
    fn test_advance_clamps_to_duration() {
        let mut sim = SimulatedPrimitive::with_duration(10.0);
        sim.play().unwrap();
        sim.advance(8.0);
        sim.advance(8.0);
        assert_eq!(sim.current_time(), 10.0);
    }
}
