//! Seek debouncing
//!
//! Rapid seek requests are coalesced into one primitive seek committed after a
//! quiet interval. Two modes share the same debouncer:
//! - [`SeekMode::Jump`]: discrete jumps (forward/backward, progress steps).
//!   Pauses on the first request of a burst and resumes after the commit if
//!   playback was running.
//! - [`SeekMode::Scrub`]: continuous scrubbing. Longer settle, never pauses
//!   and never resumes.

use crate::config::PlayerConfig;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How a seek request is debounced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekMode {
    Jump,
    Scrub,
}

/// Settle behaviour of one seek mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekPolicy {
    /// Quiet interval before committing
    pub settle: Duration,
    /// Whether the first request of a burst pauses playback
    pub pause_while_seeking: bool,
}

/// Outcome of registering a seek request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    /// When the coalesced seek should commit
    pub commit_at: Instant,
    /// The caller must pause the primitive now
    pub pause: bool,
}

/// A coalesced seek ready to be applied to the primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCommit {
    pub position: f64,
    /// Playback was paused by this burst and should resume
    pub resume: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSeek {
    target: f64,
    was_playing: bool,
}

/// Coalesces seek requests into single commits
#[derive(Debug, Clone)]
pub struct SeekDebouncer {
    jump: SeekPolicy,
    scrub: SeekPolicy,
    resume_delay: Duration,
    pending: Option<PendingSeek>,
}

impl SeekDebouncer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            jump: SeekPolicy {
                settle: config.jump_settle(),
                pause_while_seeking: true,
            },
            scrub: SeekPolicy {
                settle: config.scrub_settle(),
                pause_while_seeking: false,
            },
            resume_delay: config.resume_after_seek(),
            pending: None,
        }
    }

    pub fn policy(&self, mode: SeekMode) -> SeekPolicy {
        match mode {
            SeekMode::Jump => self.jump,
            SeekMode::Scrub => self.scrub,
        }
    }

    /// Delay between a commit and resuming playback
    pub fn resume_delay(&self) -> Duration {
        self.resume_delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Target of the pending seek, if any
    pub fn pending_target(&self) -> Option<f64> {
        self.pending.map(|p| p.target)
    }

    /// Register a request; the latest target wins
    ///
    /// `playing` is whether playback is running right now. The "was playing"
    /// flag is captured by whichever request of the burst pauses first and is
    /// kept until the burst commits.
    pub fn request(&mut self, target: f64, mode: SeekMode, playing: bool, now: Instant) -> SeekRequest {
        let policy = self.policy(mode);
        let pause = policy.pause_while_seeking && playing;
        let was_playing = self.pending.map(|p| p.was_playing).unwrap_or(false) || pause;

        self.pending = Some(PendingSeek { target, was_playing });
        debug!(target, ?mode, pause, was_playing, "Seek requested");

        SeekRequest {
            commit_at: now + policy.settle,
            pause,
        }
    }

    /// Take the pending seek for committing
    pub fn commit(&mut self) -> Option<SeekCommit> {
        self.pending.take().map(|p| SeekCommit {
            position: p.target,
            resume: p.was_playing,
        })
    }

    /// Mark the pending burst as owing a resume
    ///
    /// Used when a new burst starts while the previous one is still waiting
    /// to resume playback.
    pub fn owe_resume(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.was_playing = true;
        }
    }

    /// The pending burst will not resume playback
    pub fn forget_resume(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.was_playing = false;
        }
    }

    /// Drop the pending seek without committing
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer() -> SeekDebouncer {
        SeekDebouncer::new(&PlayerConfig::default())
    }

    #[test]
    fn test_policies_from_config() {
        let d = debouncer();
        assert_eq!(d.policy(SeekMode::Jump).settle, Duration::from_millis(100));
        assert_eq!(d.policy(SeekMode::Scrub).settle, Duration::from_millis(300));
        assert_eq!(d.resume_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_latest_target_wins() {
        let mut d = debouncer();
        let now = Instant::now();
        d.request(10.0, SeekMode::Scrub, false, now);
        let req = d.request(20.0, SeekMode::Scrub, false, now + Duration::from_millis(50));

        assert_eq!(req.commit_at, now + Duration::from_millis(350));
        assert_eq!(
            d.commit(),
            Some(SeekCommit {
                position: 20.0,
                resume: false
            })
        );
        assert_eq!(d.commit(), None);
    }

    #[test]
    fn test_jump_captures_playing_on_first_pause() {
        let mut d = debouncer();
        let now = Instant::now();

        let first = d.request(40.0, SeekMode::Jump, true, now);
        assert!(first.pause);

        // Second request sees playback already paused
        let second = d.request(50.0, SeekMode::Jump, false, now);
        assert!(!second.pause);

        let commit = d.commit().unwrap();
        assert_eq!(commit.position, 50.0);
        assert!(commit.resume);
    }

    #[test]
    fn test_scrub_never_pauses_or_resumes() {
        let mut d = debouncer();
        let req = d.request(70.0, SeekMode::Scrub, true, Instant::now());
        assert!(!req.pause);
        assert!(!d.commit().unwrap().resume);
    }

    #[test]
    fn test_owe_and_forget_resume() {
        let mut d = debouncer();
        d.request(5.0, SeekMode::Jump, false, Instant::now());
        d.owe_resume();
        assert!(d.clone().commit().unwrap().resume);
        d.forget_resume();
        assert!(!d.commit().unwrap().resume);
    }

    #[test]
    fn test_cancel() {
        let mut d = debouncer();
        d.request(5.0, SeekMode::Jump, true, Instant::now());
        assert!(d.is_pending());
        assert!(d.cancel());
        assert!(!d.is_pending());
        assert_eq!(d.commit(), None);
    }
}
