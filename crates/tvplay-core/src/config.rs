//! Player timing configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settle time for discrete jumps (seek-with-resume)
pub const JUMP_SETTLE: Duration = Duration::from_millis(100);
/// Settle time for continuous scrubbing (plain seek)
pub const SCRUB_SETTLE: Duration = Duration::from_millis(300);
/// Delay between a seek commit and resuming playback
pub const RESUME_AFTER_SEEK: Duration = Duration::from_millis(300);
/// How long the primitive may stay loading before giving up
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Inactivity window before the controls hide
pub const CONTROLS_HIDE: Duration = Duration::from_secs(3);

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Load timeout in milliseconds
    pub load_timeout_ms: u64,
    /// Seek-with-resume settle time in milliseconds
    pub jump_settle_ms: u64,
    /// Plain seek settle time in milliseconds
    pub scrub_settle_ms: u64,
    /// Delay before resuming after a seek commit, in milliseconds
    pub resume_after_seek_ms: u64,
    /// Delay before applying a saved position once ready, in milliseconds
    pub saved_resume_delay_ms: u64,
    /// Controls auto-hide in milliseconds
    pub controls_hide_ms: u64,
    /// Progress tick cadence in milliseconds
    pub progress_interval_ms: u64,
    /// Checkpoint when the whole second is a multiple of this
    pub checkpoint_every_secs: u64,
    /// Jump size for forward/backward seeks (seconds)
    pub seek_step_secs: f64,
    /// Positions at or below this are not saved (seconds)
    pub min_saved_position_secs: f64,
    /// Saved positions older than this are ignored, in milliseconds
    pub saved_position_ttl_ms: i64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: LOAD_TIMEOUT.as_millis() as u64,
            jump_settle_ms: JUMP_SETTLE.as_millis() as u64,
            scrub_settle_ms: SCRUB_SETTLE.as_millis() as u64,
            resume_after_seek_ms: RESUME_AFTER_SEEK.as_millis() as u64,
            saved_resume_delay_ms: 500,
            controls_hide_ms: CONTROLS_HIDE.as_millis() as u64,
            progress_interval_ms: 1000,
            checkpoint_every_secs: 10,
            seek_step_secs: 10.0,
            min_saved_position_secs: 30.0,
            saved_position_ttl_ms: 24 * 60 * 60 * 1000,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON document, missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject values that would stall or spin the timers
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("load_timeout_ms", self.load_timeout_ms),
            ("jump_settle_ms", self.jump_settle_ms),
            ("scrub_settle_ms", self.scrub_settle_ms),
            ("controls_hide_ms", self.controls_hide_ms),
            ("progress_interval_ms", self.progress_interval_ms),
            ("checkpoint_every_secs", self.checkpoint_every_secs),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, v)| *v == 0) {
            return Err(Error::InvalidConfig(format!("{} must be greater than zero", name)));
        }
        if !(self.seek_step_secs.is_finite() && self.seek_step_secs > 0.0) {
            return Err(Error::InvalidConfig("seek_step_secs must be positive".into()));
        }
        if self.min_saved_position_secs < 0.0 {
            return Err(Error::InvalidConfig(
                "min_saved_position_secs must not be negative".into(),
            ));
        }
        if self.saved_position_ttl_ms <= 0 {
            return Err(Error::InvalidConfig(
                "saved_position_ttl_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn jump_settle(&self) -> Duration {
        Duration::from_millis(self.jump_settle_ms)
    }

    pub fn scrub_settle(&self) -> Duration {
        Duration::from_millis(self.scrub_settle_ms)
    }

    pub fn resume_after_seek(&self) -> Duration {
        Duration::from_millis(self.resume_after_seek_ms)
    }

    pub fn saved_resume_delay(&self) -> Duration {
        Duration::from_millis(self.saved_resume_delay_ms)
    }

    pub fn controls_hide(&self) -> Duration {
        Duration::from_millis(self.controls_hide_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.load_timeout(), Duration::from_secs(30));
        assert_eq!(config.jump_settle(), Duration::from_millis(100));
        assert_eq!(config.scrub_settle(), Duration::from_millis(300));
        assert_eq!(config.controls_hide(), Duration::from_secs(3));
        assert_eq!(config.checkpoint_every_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlayerConfig::from_json_str(r#"{"scrub_settle_ms": 250}"#).unwrap();
        assert_eq!(config.scrub_settle_ms, 250);
        assert_eq!(config.jump_settle_ms, 100);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = PlayerConfig::from_json_str(r#"{"progress_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
