//! Error types for tvplay core

use thiserror::Error;

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fallback message when the primitive reports an error without a payload
pub const GENERIC_PLAYBACK_ERROR: &str = "An error occurred while playing the video";

/// Playback error types
///
/// The `Display` output of each variant is the user-facing message recorded
/// on [`PlaybackState::error`](crate::PlaybackState::error).
#[derive(Error, Debug)]
pub enum Error {
    // Source errors
    #[error("No valid video URL provided")]
    MissingSource,

    #[error("Failed to initialize video player")]
    ConfigurationFailure(String),

    // Control errors
    #[error("Failed to control video playback")]
    PlaybackControlFailure(String),

    #[error("Failed to seek video")]
    SeekFailure(String),

    #[error("Video took too long to load. Please try again.")]
    LoadTimeout,

    #[error("{0}")]
    PlaybackError(String),

    #[error("Failed to retry video playback")]
    RetryFailure(String),

    // Session errors
    #[error("Session is closed")]
    SessionClosed,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a playback error from an optional primitive message
    pub fn playback(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => Error::PlaybackError(msg),
            _ => Error::PlaybackError(GENERIC_PLAYBACK_ERROR.to_string()),
        }
    }

    /// Returns true if a retry with the alternate source is meaningful
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ConfigurationFailure(_)
                | Error::PlaybackControlFailure(_)
                | Error::SeekFailure(_)
                | Error::LoadTimeout
                | Error::PlaybackError(_)
                | Error::RetryFailure(_)
        )
    }

    /// Returns the stable error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingSource => "MISSING_SOURCE",
            Error::ConfigurationFailure(_) => "CONFIGURATION_FAILURE",
            Error::PlaybackControlFailure(_) => "PLAYBACK_CONTROL",
            Error::SeekFailure(_) => "SEEK_FAILURE",
            Error::LoadTimeout => "LOAD_TIMEOUT",
            Error::PlaybackError(_) => "PLAYBACK_ERROR",
            Error::RetryFailure(_) => "RETRY_FAILURE",
            Error::SessionClosed => "SESSION_CLOSED",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Io(_) => "IO",
            Error::Json(_) => "JSON",
        }
    }
}
