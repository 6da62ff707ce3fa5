// src/intent/mod.rs
// Intent mapping: natural-language phrases to make targets

mod mapper;
mod table;

pub use mapper::{
    ACTION_WORDS, IntentMapper, MAX_SUGGESTIONS, PARTIAL_WORD_WEIGHT, SUBSTRING_CONFIDENCE,
    SUGGESTION_THRESHOLD, calculate_confidence,
};
pub use table::DEFAULT_MAPPINGS;

use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the static intent table
#[derive(Debug, Clone, Copy)]
pub struct IntentMapping {
    pub patterns: &'static [&'static str],
    pub make_target: &'static str,
    /// Default `KEY=value` arguments passed along with the target
    pub args: &'static [(&'static str, &'static str)],
    /// Execution must be explicitly confirmed by the caller
    pub confirm: bool,
    pub description: &'static str,
    pub category: &'static str,
    /// Advisory only, never checked
    pub prerequisites: &'static [&'static str],
    pub follow_up: &'static [&'static str],
}

/// A scored mapping, owned so it can cross the tool boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub make_target: String,
    pub args: BTreeMap<String, String>,
    pub confirm: bool,
    pub description: String,
    pub category: String,
    pub prerequisites: Vec<String>,
    pub follow_up: Vec<String>,
    pub confidence: f64,
}

impl MatchResult {
    pub fn from_mapping(mapping: &IntentMapping, confidence: f64) -> Self {
        Self {
            make_target: mapping.make_target.to_string(),
            args: mapping
                .args
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            confirm: mapping.confirm,
            description: mapping.description.to_string(),
            category: mapping.category.to_string(),
            prerequisites: mapping.prerequisites.iter().map(|s| s.to_string()).collect(),
            follow_up: mapping.follow_up.iter().map(|s| s.to_string()).collect(),
            confidence,
        }
    }
}
