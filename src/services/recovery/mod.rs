//! Snapshot Recovery Service
//!
//! Keeps a local safety copy of whatever the user is composing so an
//! interruption (crash, reload, navigating away) loses at most one debounce
//! window of typing. Content is only ever handed back when the host asks,
//! after the user has agreed to recover it.
//!
//! ## How it works
//!
//! 1. **Debounced save**: every change calls `save_snapshot`; the write is
//!    deferred until the input has been quiet for `debounce_ms`
//! 2. **Tick**: the host loop calls `tick` so due writes are persisted
//! 3. **Offer**: on mount, the host checks `has_recovery`/`offer_recovery`
//! 4. **Clear**: after the user accepts or discards, or after the backend of
//!    record confirms a durable save, the snapshot is removed
//!
//! ## Storage Layout
//!
//! ```text
//! mirror_recovery_snapshot          # current RecoverySnapshot (JSON)
//! mirror_recovery_snapshot_history  # up to history_limit snapshots, newest first
//! ```
//!
//! Storage failures never reach the caller: they are logged and the
//! operation behaves as if there were no snapshot.
//!
//! ## Usage
//!
//! ```rust
//! use mirror::services::recovery::{RecoveryConfig, SnapshotRecoveryService};
//! use mirror::services::storage::MemoryStore;
//! use mirror::services::time_source::TestTimeSource;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let time = Arc::new(TestTimeSource::new());
//! let mut recovery = SnapshotRecoveryService::new(
//!     RecoveryConfig::default(),
//!     MemoryStore::shared(),
//!     time.clone(),
//! );
//!
//! recovery.save_snapshot("Dear journal", None);
//! time.advance(Duration::from_millis(100));
//! recovery.tick();
//!
//! assert!(recovery.has_recovery());
//! ```

mod debounce;
pub mod types;

pub use debounce::{DebounceState, Debouncer};
pub use types::{generate_snapshot_id, InputModality, RecoverySnapshot, SnapshotMetadata};

use crate::services::storage::{SharedStore, HISTORY_KEY, SNAPSHOT_KEY};
use crate::services::time_source::SharedTimeSource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the recovery service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecoveryConfig {
    /// Whether local recovery snapshots are kept at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quiet period before a snapshot is written, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of entries kept by `save_to_history`
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Snapshots older than this are not offered back (seconds)
    #[serde(default = "default_max_offer_age_secs")]
    pub max_offer_age_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_history_limit() -> usize {
    10
}

fn default_max_offer_age_secs() -> u64 {
    60 * 60 // 1 hour
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
            history_limit: default_history_limit(),
            max_offer_age_secs: default_max_offer_age_secs(),
        }
    }
}

/// Content waiting for the debounce window to close
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSnapshot {
    content: String,
    metadata: Option<SnapshotMetadata>,
}

/// The recovery service, one instance per input stream
#[derive(Debug)]
pub struct SnapshotRecoveryService {
    store: SharedStore,
    time: SharedTimeSource,
    config: RecoveryConfig,
    debounce: Debouncer<PendingSnapshot>,
}

impl SnapshotRecoveryService {
    pub fn new(config: RecoveryConfig, store: SharedStore, time: SharedTimeSource) -> Self {
        let debounce = Debouncer::new(Duration::from_millis(config.debounce_ms));
        Self {
            store,
            time,
            config,
            debounce,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    // ========================================================================
    // Debounced single-slot snapshot
    // ========================================================================

    /// Schedule a snapshot of `content`.
    ///
    /// Calls within the debounce window collapse into one write carrying the
    /// latest content.
    pub fn save_snapshot(
        &mut self,
        content: impl Into<String>,
        metadata: Option<SnapshotMetadata>,
    ) {
        if !self.config.enabled {
            return;
        }

        let pending = PendingSnapshot {
            content: content.into(),
            metadata,
        };
        if self.debounce.schedule(self.time.now(), pending) {
            tracing::trace!("Recovery snapshot rescheduled");
        }
    }

    /// Persist the pending snapshot if its window has closed.
    ///
    /// Returns true if a snapshot was written.
    pub fn tick(&mut self) -> bool {
        match self.debounce.poll(self.time.now()) {
            Some(pending) => self.write_snapshot(pending),
            None => false,
        }
    }

    /// Persist the pending snapshot immediately.
    pub fn flush(&mut self) -> bool {
        match self.debounce.take() {
            Some(pending) => self.write_snapshot(pending),
            None => false,
        }
    }

    /// Drop the pending snapshot without writing it (host teardown).
    pub fn cancel_pending(&mut self) {
        if self.debounce.cancel() {
            tracing::debug!("Cancelled pending recovery snapshot");
        }
    }

    pub fn has_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    fn write_snapshot(&self, pending: PendingSnapshot) -> bool {
        let snapshot =
            RecoverySnapshot::new(pending.content, self.time.now_millis(), pending.metadata);
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize recovery snapshot: {}", e);
                return false;
            }
        };

        match self.store.set(SNAPSHOT_KEY, &json) {
            Ok(()) => {
                tracing::trace!(
                    "Saved recovery snapshot {} ({} bytes)",
                    snapshot.id,
                    snapshot.content.len()
                );
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save recovery snapshot: {}", e);
                false
            }
        }
    }

    /// The most recent snapshot, or None if absent, unreadable, or corrupt.
    pub fn get_snapshot(&self) -> Option<RecoverySnapshot> {
        if !self.config.enabled {
            return None;
        }

        let raw = match self.store.get(SNAPSHOT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read recovery snapshot: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring corrupt recovery snapshot: {}", e);
                None
            }
        }
    }

    /// Cheap presence check; does not parse the stored value.
    pub fn has_recovery(&self) -> bool {
        if !self.config.enabled {
            return false;
        }

        match self.store.get(SNAPSHOT_KEY) {
            Ok(raw) => raw.is_some(),
            Err(e) => {
                tracing::warn!("Failed to check recovery snapshot: {}", e);
                false
            }
        }
    }

    /// Seconds since the snapshot was written, None if there is none.
    pub fn get_recovery_age(&self) -> Option<u64> {
        self.get_snapshot()
            .map(|snapshot| snapshot.age_seconds(self.time.now_millis()))
    }

    /// Human-readable age of `snapshot`, e.g. "3m ago".
    pub fn age_display(&self, snapshot: &RecoverySnapshot) -> String {
        snapshot.age_display(self.time.now_millis())
    }

    /// Delete the current snapshot and any pending write.
    ///
    /// Call after the user recovers or discards, and after the backend of
    /// record confirms a durable save.
    pub fn clear_snapshot(&mut self) {
        self.debounce.cancel();
        match self.store.remove(SNAPSHOT_KEY) {
            Ok(()) => tracing::debug!("Cleared recovery snapshot"),
            Err(e) => tracing::warn!("Failed to clear recovery snapshot: {}", e),
        }
    }

    // ========================================================================
    // Recovery offers
    // ========================================================================

    /// The snapshot if it is no older than `max_age`.
    ///
    /// A stale snapshot is cleared so it is not offered again.
    pub fn offer_recovery(&mut self, max_age: Duration) -> Option<RecoverySnapshot> {
        if !self.has_recovery() {
            return None;
        }

        let snapshot = self.get_snapshot()?;
        let age = snapshot.age_seconds(self.time.now_millis());
        if age > max_age.as_secs() {
            tracing::debug!("Discarding stale recovery snapshot ({}s old)", age);
            self.clear_snapshot();
            return None;
        }
        Some(snapshot)
    }

    /// `offer_recovery` with the configured maximum age.
    pub fn offer_default(&mut self) -> Option<RecoverySnapshot> {
        self.offer_recovery(Duration::from_secs(self.config.max_offer_age_secs))
    }

    /// Hand the snapshot back to the user and remove it.
    pub fn accept_recovery(&mut self) -> Option<RecoverySnapshot> {
        let snapshot = self.get_snapshot();
        self.clear_snapshot();
        if snapshot.is_some() {
            tracing::info!("Recovered composer content from local snapshot");
        }
        snapshot
    }

    /// The user declined the offer.
    pub fn discard_recovery(&mut self) {
        self.clear_snapshot();
    }

    /// Remove the stored snapshot only if it is still the one with `id`.
    ///
    /// Used once an offer has been answered: newer content saved since the
    /// offer, and any pending write, are left alone. Returns true if removed.
    pub fn resolve_offer(&mut self, id: &str) -> bool {
        match self.get_snapshot() {
            Some(stored) if stored.id == id => {}
            _ => {
                tracing::debug!("Offered snapshot {} already replaced", id);
                return false;
            }
        }

        match self.store.remove(SNAPSHOT_KEY) {
            Ok(()) => {
                tracing::debug!("Removed offered recovery snapshot {}", id);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to remove offered recovery snapshot: {}", e);
                false
            }
        }
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Prepend a snapshot to the capped history list (written immediately).
    pub fn save_to_history(
        &mut self,
        content: impl Into<String>,
        metadata: Option<SnapshotMetadata>,
    ) {
        if !self.config.enabled {
            return;
        }

        let snapshot = RecoverySnapshot::new(content.into(), self.time.now_millis(), metadata);
        let mut history = self.get_history();
        history.insert(0, snapshot);
        history.truncate(self.config.history_limit);

        let json = match serde_json::to_string(&history) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize recovery history: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(HISTORY_KEY, &json) {
            tracing::warn!("Failed to save recovery history: {}", e);
        }
    }

    /// History entries, newest first. Corrupt or unreadable history is empty.
    pub fn get_history(&self) -> Vec<RecoverySnapshot> {
        if !self.config.enabled {
            return Vec::new();
        }

        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read recovery history: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt recovery history: {}", e);
            Vec::new()
        })
    }

    /// Clear the snapshot, the history, and any pending write.
    pub fn clear_all(&mut self) {
        self.clear_snapshot();
        match self.store.remove(HISTORY_KEY) {
            Ok(()) => tracing::debug!("Cleared recovery history"),
            Err(e) => tracing::warn!("Failed to clear recovery history: {}", e),
        }
    }
}
