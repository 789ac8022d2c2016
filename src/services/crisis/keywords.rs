//! Keyword lists for local crisis language detection.
//!
//! Lists are data, not code: hosts can ship their own through config.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Explicit self-harm language. Any single match is urgent.
const DEFAULT_URGENT: &[&str] = &[
    "kill myself",
    "end my life",
    "take my own life",
    "want to die",
    "wish i was dead",
    "better off dead",
    "suicide",
    "suicidal",
    "self harm",
    "self-harm",
    "hurt myself",
    "no reason to live",
    "end it all",
];

/// Hopelessness and overwhelm. Only meaningful in combination.
const DEFAULT_CONCERN: &[&str] = &[
    "hopeless",
    "worthless",
    "overwhelming",
    "overwhelmed",
    "can't go on",
    "cannot go on",
    "tired of living",
    "no way out",
    "trapped",
    "nobody cares",
    "no one cares",
    "can't take it anymore",
    "empty inside",
    "a burden",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordLists {
    #[serde(default = "default_urgent")]
    pub urgent: Vec<String>,

    #[serde(default = "default_concern")]
    pub concern: Vec<String>,
}

fn default_urgent() -> Vec<String> {
    DEFAULT_URGENT.iter().map(|s| s.to_string()).collect()
}

fn default_concern() -> Vec<String> {
    DEFAULT_CONCERN.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordLists {
    fn default() -> Self {
        Self {
            urgent: default_urgent(),
            concern: default_concern(),
        }
    }
}

impl KeywordLists {
    pub fn new(urgent: Vec<String>, concern: Vec<String>) -> Self {
        Self { urgent, concern }.normalized()
    }

    /// Lowercase, trim, drop empties and duplicates (first occurrence wins).
    pub fn normalized(self) -> Self {
        Self {
            urgent: normalize_list(self.urgent),
            concern: normalize_list(self.concern),
        }
    }
}

fn normalize_list(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(list.len());
    for keyword in list {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}
