//! Playback primitive interface
//!
//! The platform media engine is opaque to the core. The driver issues
//! commands through [`PlaybackPrimitive`] and receives `statusChange`
//! notifications through a subscribed [`StatusListener`].

use crate::types::{PrimitiveStatus, StatusEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

/// Channel a primitive pushes status events into
pub type StatusListener = mpsc::UnboundedSender<StatusEvent>;

/// Handle returned by [`PlaybackPrimitive::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Fault raised by the primitive for a single command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PrimitiveError {
    pub message: String,
}

impl PrimitiveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Configuration applied when a source is initialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveOptions {
    pub looping: bool,
    /// External screens and picture-in-picture
    pub allows_external_playback: bool,
    pub muted: bool,
}

impl Default for PrimitiveOptions {
    fn default() -> Self {
        Self {
            looping: false,
            allows_external_playback: true,
            muted: false,
        }
    }
}

/// Platform media engine driven by the core
pub trait PlaybackPrimitive: Send {
    /// Load a source and apply playback options
    fn initialize(&mut self, source: &Url, options: PrimitiveOptions) -> Result<(), PrimitiveError>;

    fn play(&mut self) -> Result<(), PrimitiveError>;

    fn pause(&mut self) -> Result<(), PrimitiveError>;

    /// Move the playhead (seconds)
    fn set_current_time(&mut self, seconds: f64) -> Result<(), PrimitiveError>;

    /// Swap the loaded source in place
    fn replace_source(&mut self, source: &Url) -> Result<(), PrimitiveError>;

    fn playing(&self) -> bool;

    /// Live playhead (seconds)
    fn current_time(&self) -> f64;

    /// Media duration (seconds), zero when unknown
    fn duration(&self) -> f64;

    fn status(&self) -> PrimitiveStatus;

    /// Register a listener for `statusChange` notifications
    fn subscribe(&mut self, listener: StatusListener) -> SubscriptionId;

    /// Drop a listener, unknown ids are ignored
    fn unsubscribe(&mut self, id: SubscriptionId);
}
