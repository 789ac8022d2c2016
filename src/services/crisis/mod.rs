//! Local Pattern Detector
//!
//! Flags possible crisis language in freshly typed text. Everything happens
//! on-device: the text is matched against keyword lists and never leaves the
//! process. The result is advisory and must never block submission.
//!
//! Classification:
//! - input shorter than `min_length` characters is never classified
//! - any urgent keyword makes the result urgent (concern is not evaluated)
//! - otherwise `concern_threshold` distinct concern keywords make it concern
//!
//! A dismissal of the banner is remembered for `dismissal_cooldown_secs`.
//! It only decides whether a banner is shown, detection always runs.

mod banner;
pub mod keywords;

pub use banner::{BannerState, CrisisBanner};
pub use keywords::KeywordLists;

use crate::services::storage::{SharedStore, DISMISSAL_KEY};
use crate::services::time_source::SharedTimeSource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered confidence that text contains crisis language
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Concern,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisDetectionResult {
    pub detected: bool,
    pub severity: Severity,
    /// Keywords from the list that decided the outcome (for the safety event log)
    pub patterns: Vec<String>,
}

impl CrisisDetectionResult {
    pub fn none() -> Self {
        Self {
            detected: false,
            severity: Severity::None,
            patterns: Vec::new(),
        }
    }

    fn matched(severity: Severity, patterns: Vec<String>) -> Self {
        Self {
            detected: true,
            severity,
            patterns,
        }
    }
}

/// Detector tuning.
///
/// `min_length` and `concern_threshold` reproduce the composer's observed
/// behavior; they are exposed so they can be tuned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetectorConfig {
    /// Texts with fewer characters are never classified
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Distinct concern keywords required for a concern result
    #[serde(default = "default_concern_threshold")]
    pub concern_threshold: usize,

    /// How long a dismissal suppresses the banner, in seconds
    #[serde(default = "default_dismissal_cooldown_secs")]
    pub dismissal_cooldown_secs: u64,

    #[serde(default)]
    pub keywords: KeywordLists,
}

fn default_min_length() -> usize {
    20
}

fn default_concern_threshold() -> usize {
    2
}

fn default_dismissal_cooldown_secs() -> u64 {
    24 * 60 * 60 // 24 hours
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            concern_threshold: default_concern_threshold(),
            dismissal_cooldown_secs: default_dismissal_cooldown_secs(),
            keywords: KeywordLists::default(),
        }
    }
}

#[derive(Debug)]
pub struct CrisisDetector {
    config: DetectorConfig,
    store: SharedStore,
    time: SharedTimeSource,
}

impl CrisisDetector {
    pub fn new(config: DetectorConfig, store: SharedStore, time: SharedTimeSource) -> Self {
        // A zero threshold would flag any long text with no matched patterns
        let config = DetectorConfig {
            concern_threshold: config.concern_threshold.max(1),
            keywords: config.keywords.normalized(),
            ..config
        };
        Self {
            config,
            store,
            time,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify `text`. Pure: no I/O, no state.
    pub fn analyze(&self, text: &str) -> CrisisDetectionResult {
        if text.chars().count() < self.config.min_length {
            return CrisisDetectionResult::none();
        }

        let lowered = text.to_lowercase();
        let matched_in = |list: &[String]| -> Vec<String> {
            list.iter()
                .filter(|keyword| lowered.contains(keyword.as_str()))
                .cloned()
                .collect()
        };

        let urgent = matched_in(&self.config.keywords.urgent);
        if !urgent.is_empty() {
            return CrisisDetectionResult::matched(Severity::Urgent, urgent);
        }

        let concern = matched_in(&self.config.keywords.concern);
        if concern.len() >= self.config.concern_threshold {
            return CrisisDetectionResult::matched(Severity::Concern, concern);
        }

        CrisisDetectionResult::none()
    }

    /// Whether the banner was dismissed within the cooldown window.
    pub fn is_dismissed_recently(&self) -> bool {
        let raw = match self.store.get(DISMISSAL_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Failed to read crisis banner dismissal: {}", e);
                return false;
            }
        };

        let Ok(dismissed_at) = raw.trim().parse::<i64>() else {
            tracing::warn!("Ignoring unreadable crisis banner dismissal: {:?}", raw);
            return false;
        };

        let cooldown_ms = i64::try_from(self.config.dismissal_cooldown_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        self.time.now_millis().saturating_sub(dismissed_at) < cooldown_ms
    }

    /// Remember that the user dismissed the banner now.
    pub fn record_dismissal(&self) {
        let now = self.time.now_millis();
        match self.store.set(DISMISSAL_KEY, &now.to_string()) {
            Ok(()) => tracing::debug!("Recorded crisis banner dismissal at {}", now),
            Err(e) => tracing::warn!("Failed to record crisis banner dismissal: {}", e),
        }
    }

    /// Forget any dismissal (sign-out, "forget this device").
    pub fn clear_dismissal(&self) {
        if let Err(e) = self.store.remove(DISMISSAL_KEY) {
            tracing::warn!("Failed to clear crisis banner dismissal: {}", e);
        }
    }

    /// Whether a banner should be displayed for `result`.
    pub fn should_display(&self, result: &CrisisDetectionResult) -> bool {
        result.detected && !self.is_dismissed_recently()
    }
}
