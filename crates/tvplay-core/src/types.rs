//! Core types for tvplay

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Unique identifier for a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable playback state of one session
///
/// `current_time <= duration` once `duration` is known and positive.
/// `is_loading` and `error` are mutually exclusive in steady state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Seconds
    pub current_time: f64,
    /// Seconds, zero until the primitive reports it
    pub duration: f64,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl PlaybackState {
    /// State of a freshly opened session
    pub fn loading() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            is_loading: true,
            error: None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::loading()
    }
}

/// Last-known position of a content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPosition {
    pub content_id: String,
    /// Seconds
    pub position: f64,
    pub saved_at_epoch_ms: i64,
}

/// Device form factor, decides which source is tried first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFactor {
    Tv,
    #[default]
    Handheld,
}

/// Which of the two content URLs is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Progressive/direct URL
    Direct,
    /// HLS playlist URL
    Hls,
}

impl SourceKind {
    pub fn other(self) -> Self {
        match self {
            SourceKind::Direct => SourceKind::Hls,
            SourceKind::Hls => SourceKind::Direct,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Direct => write!(f, "direct"),
            SourceKind::Hls => write!(f, "hls"),
        }
    }
}

/// Content reference, immutable for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSource {
    pub video_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hls_url: String,
}

impl ContentSource {
    pub fn new(
        video_id: impl Into<String>,
        url: impl Into<String>,
        hls_url: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            url: url.into(),
            hls_url: hls_url.into(),
        }
    }

    /// Source kind tried first on the given form factor
    pub fn preferred_kind(form_factor: FormFactor) -> SourceKind {
        match form_factor {
            FormFactor::Tv => SourceKind::Hls,
            FormFactor::Handheld => SourceKind::Direct,
        }
    }

    /// Parsed URL for a source kind; `None` when blank or unparseable
    pub fn url_for(&self, kind: SourceKind) -> Option<Url> {
        let raw = match kind {
            SourceKind::Direct => &self.url,
            SourceKind::Hls => &self.hls_url,
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Url::parse(raw).ok()
    }
}

/// Status reported by the playback primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveStatus {
    Idle,
    Loading,
    ReadyToPlay,
    Error,
    /// Any status outside the four the driver reacts to specifically
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for PrimitiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveStatus::Idle => write!(f, "idle"),
            PrimitiveStatus::Loading => write!(f, "loading"),
            PrimitiveStatus::ReadyToPlay => write!(f, "readyToPlay"),
            PrimitiveStatus::Error => write!(f, "error"),
            PrimitiveStatus::Other(other) => write!(f, "{}", other),
        }
    }
}

/// Error payload attached to an `error` status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusPayload {
    Text(String),
    Structured { message: Option<String> },
}

impl StatusPayload {
    pub fn message(&self) -> Option<&str> {
        match self {
            StatusPayload::Text(text) => Some(text.as_str()),
            StatusPayload::Structured { message } => message.as_deref(),
        }
    }
}

/// A single `statusChange` notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: PrimitiveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StatusPayload>,
}

impl StatusEvent {
    pub fn new(status: PrimitiveStatus) -> Self {
        Self { status, error: None }
    }

    pub fn error(payload: Option<StatusPayload>) -> Self {
        Self {
            status: PrimitiveStatus::Error,
            error: payload,
        }
    }
}
