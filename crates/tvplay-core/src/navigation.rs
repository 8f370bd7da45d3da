//! Remote-control focus navigation
//!
//! A pure transition function from `(focus, event)` to the next focus and the
//! action the session should run. Rendering and timers live elsewhere.
//!
//! ```text
//!   [back] [seekBackward] [playPause] [seekForward]     <- control row
//!   [============== progress ==============]           <- progress bar
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Control that receives `select`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusTarget {
    Back,
    SeekBackward,
    PlayPause,
    SeekForward,
    Progress,
    #[default]
    None,
}

impl FocusTarget {
    /// Control row in left-to-right order
    pub const CONTROLS: [FocusTarget; 4] = [
        FocusTarget::Back,
        FocusTarget::SeekBackward,
        FocusTarget::PlayPause,
        FocusTarget::SeekForward,
    ];

    /// Focus when the player opens
    pub const INITIAL: FocusTarget = FocusTarget::PlayPause;

    fn control_index(self) -> Option<usize> {
        Self::CONTROLS.iter().position(|c| *c == self)
    }

    fn previous_control(self) -> FocusTarget {
        match self.control_index() {
            Some(i) => Self::CONTROLS[i.saturating_sub(1)],
            None => Self::INITIAL,
        }
    }

    fn next_control(self) -> FocusTarget {
        match self.control_index() {
            Some(i) => Self::CONTROLS[(i + 1).min(Self::CONTROLS.len() - 1)],
            None => Self::INITIAL,
        }
    }
}

impl std::fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FocusTarget::Back => write!(f, "back"),
            FocusTarget::SeekBackward => write!(f, "seekBackward"),
            FocusTarget::PlayPause => write!(f, "playPause"),
            FocusTarget::SeekForward => write!(f, "seekForward"),
            FocusTarget::Progress => write!(f, "progress"),
            FocusTarget::None => write!(f, "none"),
        }
    }
}

/// Remote key carried by an input event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    Menu,
    Back,
    #[serde(untagged)]
    Other(String),
}

impl FromStr for RemoteKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "up" => RemoteKey::Up,
            "down" => RemoteKey::Down,
            "left" => RemoteKey::Left,
            "right" => RemoteKey::Right,
            "select" | "enter" | "ok" => RemoteKey::Select,
            "menu" => RemoteKey::Menu,
            "back" => RemoteKey::Back,
            other => RemoteKey::Other(other.to_string()),
        })
    }
}

/// Press/release phase, only presses act
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPhase {
    #[default]
    Press,
    Release,
}

/// Discrete remote-control event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub key: RemoteKey,
    #[serde(default)]
    pub phase: KeyPhase,
}

impl RemoteEvent {
    pub fn press(key: RemoteKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Press,
        }
    }

    pub fn release(key: RemoteKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Release,
        }
    }
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavAction {
    None,
    Close,
    TogglePlayPause,
    /// Jump back one step, clamped at zero
    SeekBackward,
    /// Jump forward one step, clamped at the duration
    SeekForward,
    Retry,
}

/// Result of feeding one event to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub focus: FocusTarget,
    pub action: NavAction,
    /// The controls auto-hide window restarts
    pub restart_hide: bool,
}

impl Transition {
    fn stay(focus: FocusTarget) -> Self {
        Self {
            focus,
            action: NavAction::None,
            restart_hide: true,
        }
    }

    fn move_to(focus: FocusTarget) -> Self {
        Self::stay(focus)
    }

    fn act(focus: FocusTarget, action: NavAction) -> Self {
        Self {
            focus,
            action,
            restart_hide: true,
        }
    }
}

/// Next focus and action during normal playback
pub fn transition(focus: FocusTarget, event: &RemoteEvent) -> Transition {
    use FocusTarget as F;

    if event.phase == KeyPhase::Release {
        return Transition {
            focus,
            action: NavAction::None,
            restart_hide: false,
        };
    }

    match (&event.key, focus) {
        (RemoteKey::Menu | RemoteKey::Back, _) => Transition::act(focus, NavAction::Close),

        (RemoteKey::Select, F::Back) => Transition::act(F::Back, NavAction::Close),
        (RemoteKey::Select, F::PlayPause) => Transition::act(F::PlayPause, NavAction::TogglePlayPause),
        (RemoteKey::Select, F::SeekBackward) => Transition::act(F::SeekBackward, NavAction::SeekBackward),
        (RemoteKey::Select, F::SeekForward) => Transition::act(F::SeekForward, NavAction::SeekForward),
        (RemoteKey::Select, F::Progress | F::None) => Transition::stay(focus),

        (RemoteKey::Left, F::Progress) => Transition::act(F::Progress, NavAction::SeekBackward),
        (RemoteKey::Right, F::Progress) => Transition::act(F::Progress, NavAction::SeekForward),
        (RemoteKey::Left, _) => Transition::move_to(focus.previous_control()),
        (RemoteKey::Right, _) => Transition::move_to(focus.next_control()),

        (RemoteKey::Up, F::Progress) => Transition::move_to(F::PlayPause),
        (RemoteKey::Up, _) => Transition::move_to(F::Back),
        (RemoteKey::Down, F::Progress) => Transition::stay(F::Progress),
        (RemoteKey::Down, _) => Transition::move_to(F::Progress),

        (RemoteKey::Other(_), _) => Transition::stay(focus),
    }
}

/// Next focus and action while the session shows an error
///
/// Normal controls are suspended: `select` retries, menu/back close, and
/// everything else only restarts the auto-hide window.
pub fn error_transition(focus: FocusTarget, event: &RemoteEvent) -> Transition {
    if event.phase == KeyPhase::Release {
        return Transition {
            focus,
            action: NavAction::None,
            restart_hide: false,
        };
    }

    match event.key {
        RemoteKey::Select => Transition::act(focus, NavAction::Retry),
        RemoteKey::Menu | RemoteKey::Back => Transition::act(focus, NavAction::Close),
        _ => Transition::stay(focus),
    }
}
