//! Playback position store
//!
//! Keeps the last-known position per content item so a reopened session can
//! resume where the viewer left off:
//! - Trivial positions (at or below the threshold) are never recorded
//! - Entries older than the TTL read as absent
//! - Optional JSON persistence for callers that want durability

use crate::{
    clock::{Clock, SystemClock},
    config::PlayerConfig,
    types::SavedPosition,
    Result,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Keyed store of saved positions
///
/// Cloning yields another handle onto the same entries, so every session
/// of one process shares a single store.
#[derive(Clone)]
pub struct PositionStore {
    entries: Arc<Mutex<HashMap<String, SavedPosition>>>,
    clock: Arc<dyn Clock>,
    min_position: f64,
    ttl_ms: i64,
}

impl PositionStore {
    /// Create a store on the system clock with default thresholds
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store on a custom clock with default thresholds
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let defaults = PlayerConfig::default();
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            min_position: defaults.min_saved_position_secs,
            ttl_ms: defaults.saved_position_ttl_ms,
        }
    }

    /// Apply thresholds from a player configuration
    pub fn with_config(mut self, config: &PlayerConfig) -> Self {
        self.min_position = config.min_saved_position_secs;
        self.ttl_ms = config.saved_position_ttl_ms;
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SavedPosition>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Entries stamped in the future or older than the TTL are stale
    fn is_recent(&self, entry: &SavedPosition, now_ms: i64) -> bool {
        let age = now_ms.saturating_sub(entry.saved_at_epoch_ms);
        (0..self.ttl_ms).contains(&age)
    }

    /// Record a position, overwriting any prior entry
    ///
    /// Positions at or below the threshold are ignored.
    pub fn save(&self, content_id: &str, position: f64) {
        if position.is_nan() || position <= self.min_position {
            return;
        }
        let entry = SavedPosition {
            content_id: content_id.to_string(),
            position,
            saved_at_epoch_ms: self.clock.now_epoch_ms(),
        };
        debug!(content_id, position, "Position saved");
        self.lock().insert(content_id.to_string(), entry);
    }

    /// Saved position if recent, otherwise `0.0`
    pub fn get(&self, content_id: &str) -> f64 {
        let now_ms = self.clock.now_epoch_ms();
        self.lock()
            .get(content_id)
            .filter(|entry| self.is_recent(entry, now_ms))
            .map(|entry| entry.position)
            .unwrap_or(0.0)
    }

    /// Remove the entry for a content item, stale or not
    ///
    /// Returns true if an entry was removed.
    pub fn clear(&self, content_id: &str) -> bool {
        self.lock().remove(content_id).is_some()
    }

    /// Remove every entry
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Drop stale entries, returns how many were removed
    pub fn prune_expired(&self) -> usize {
        let now_ms = self.clock.now_epoch_ms();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| self.is_recent(entry, now_ms));
        before - entries.len()
    }

    /// Recent entries sorted by content id
    pub fn entries(&self) -> Vec<SavedPosition> {
        let now_ms = self.clock.now_epoch_ms();
        let mut recent: Vec<_> = self
            .lock()
            .values()
            .filter(|entry| self.is_recent(entry, now_ms))
            .cloned()
            .collect();
        recent.sort_by(|a, b| a.content_id.cmp(&b.content_id));
        recent
    }

    /// Write all entries to a JSON file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut all: Vec<_> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.content_id.cmp(&b.content_id));
        let json = serde_json::to_string_pretty(&all)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Merge entries from a JSON file, returns how many were loaded
    ///
    /// A missing file loads nothing.
    pub fn load_from(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(0);
        }
        let contents = std::fs::read_to_string(path)?;
        let loaded: Vec<SavedPosition> = serde_json::from_str(&contents)?;
        let count = loaded.len();
        let mut entries = self.lock();
        for entry in loaded {
            entries.insert(entry.content_id.clone(), entry);
        }
        debug!(count, path = %path.display(), "Positions loaded");
        Ok(count)
    }
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PositionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionStore")
            .field("entries", &self.lock().len())
            .field("min_position", &self.min_position)
            .field("ttl_ms", &self.ttl_ms)
            .finish()
    }
}
