//! Recovery data types
//!
//! Snapshots are stored as JSON using the same field names the web
//! composer uses, so a store shared with the browser build stays readable.

use serde::{Deserialize, Serialize};

/// How the content being composed was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModality {
    Text,
    Voice,
    Video,
    Document,
}

/// Free-form context attached to a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Reflection thread the content belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Named identity axis the user was reflecting on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_axis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputModality>,
}

impl SnapshotMetadata {
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    pub fn with_identity_axis(mut self, axis: impl Into<String>) -> Self {
        self.identity_axis = Some(axis.into());
        self
    }

    pub fn with_input_type(mut self, input_type: InputModality) -> Self {
        self.input_type = Some(input_type);
        self
    }
}

/// A timestamped copy of in-progress input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverySnapshot {
    /// Fresh for every write
    pub id: String,

    /// Full text at the time of the snapshot
    pub content: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
}

impl RecoverySnapshot {
    /// Build a snapshot with a newly generated id
    pub fn new(content: String, timestamp: i64, metadata: Option<SnapshotMetadata>) -> Self {
        Self {
            id: generate_snapshot_id(),
            content,
            timestamp,
            metadata,
        }
    }

    /// Whole seconds elapsed between the snapshot and `now_millis`.
    ///
    /// A snapshot stamped in the future (clock moved backwards) reports 0.
    pub fn age_seconds(&self, now_millis: i64) -> u64 {
        (now_millis.saturating_sub(self.timestamp).max(0) / 1000) as u64
    }

    /// Format the age as a human-readable string
    pub fn age_display(&self, now_millis: i64) -> String {
        let secs = self.age_seconds(now_millis);
        if secs < 60 {
            format!("{secs}s ago")
        } else if secs < 3600 {
            format!("{}m ago", secs / 60)
        } else if secs < 86400 {
            format!("{}h ago", secs / 3600)
        } else {
            format!("{}d ago", secs / 86400)
        }
    }
}

/// Generate a unique snapshot id
pub fn generate_snapshot_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
