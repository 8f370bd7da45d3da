//! tvplay Core - playback control for remote-driven TV players
//!
//! This crate provides the control layer of a full-screen video player:
//! - Player driver over an opaque platform playback primitive
//! - Debounced seeking with resume-after-seek
//! - Remote-control focus navigation
//! - Playback state reducer with change notifications
//! - Saved positions with staleness expiry
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         tvplay Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   remote keys        status events           timer deadlines    │
//! │        │                   │                        │           │
//! │        └───────────────────┼────────────────────────┘           │
//! │                     ┌──────┴──────┐                             │
//! │                     │   Session   │──── Navigation (pure)       │
//! │                     │   Runner    │                             │
//! │                     └──────┬──────┘                             │
//! │                     ┌──────┴──────┐                             │
//! │                     │   Player    │──── Seek Debouncer          │
//! │                     │   Driver    │──── Position Store          │
//! │                     └──────┬──────┘                             │
//! │              ┌─────────────┴─────────────┐                      │
//! │       ┌──────┴──────┐             ┌──────┴──────┐               │
//! │       │  Playback   │             │  Playback   │               │
//! │       │  Primitive  │             │  Reducer    │               │
//! │       └─────────────┘             └─────────────┘               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod navigation;
pub mod position;
pub mod primitive;
pub mod runner;
pub mod seek;
pub mod session;
pub mod sim;
pub mod state;
pub mod timer;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PlayerConfig;
pub use driver::PlayerDriver;
pub use error::{Error, Result};
pub use navigation::{FocusTarget, KeyPhase, NavAction, RemoteEvent, RemoteKey, Transition};
pub use position::PositionStore;
pub use primitive::{PlaybackPrimitive, PrimitiveError, PrimitiveOptions, StatusListener, SubscriptionId};
pub use runner::{SessionHandle, SessionInput, SessionOutcome, SessionRunner};
pub use seek::{SeekDebouncer, SeekMode};
pub use session::{CloseReason, PlayerSession, SessionSnapshot};
pub use sim::SimulatedPrimitive;
pub use state::{PlaybackReducer, PlaybackUpdate};
pub use timer::{TimerKind, TimerSet};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library start-up
pub fn init() {
    tracing::info!(version = VERSION, "tvplay core initialized");
}
