// src/intent/mapper.rs
// Phrase scoring against the intent table

use super::{DEFAULT_MAPPINGS, IntentMapping, MatchResult};
use tracing::debug;

/// `map_intent` only answers above this score
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

/// `get_suggestions` drops mappings at or below this score
pub const MIN_SUGGESTION_CONFIDENCE: f64 = 0.3;

pub const MAX_SUGGESTIONS: usize = 5;

/// Pattern found verbatim inside the input
pub const SUBSTRING_CONFIDENCE: f64 = 0.95;

/// Share of a word's weight granted for a partial (substring) word match
pub const PARTIAL_WORD_WEIGHT: f64 = 0.7;

const FIRST_WORD_WEIGHT: f64 = 2.0;
const ACTION_BOOST: f64 = 1.2;
const UNMATCHED_PENALTY: f64 = 0.8;
const MAX_UNMATCHED_WORDS: usize = 3;

/// Verbs that boost a score when shared by input and pattern
pub const ACTION_WORDS: &[&str] = &[
    "start", "stop", "run", "build", "test", "deploy", "migrate", "check", "status",
];

/// Score one normalized (lowercased) input against one pattern
pub fn calculate_confidence(input: &str, pattern: &str) -> f64 {
    if input == pattern {
        return 1.0;
    }
    if input.contains(pattern) {
        return SUBSTRING_CONFIDENCE;
    }

    let input_words: Vec<&str> = input.split_whitespace().collect();
    let pattern_words: Vec<&str> = pattern.split_whitespace().collect();

    let mut matched = 0.0;
    let mut total = 0.0;
    for (i, pw) in pattern_words.iter().enumerate() {
        let weight = if i == 0 { FIRST_WORD_WEIGHT } else { 1.0 };
        total += weight;

        if input_words.contains(pw) {
            matched += weight;
        } else if input_words.iter().any(|iw| iw.contains(pw) || pw.contains(iw)) {
            matched += weight * PARTIAL_WORD_WEIGHT;
        }
    }

    let mut score = if total > 0.0 { matched / total } else { 0.0 };

    if ACTION_WORDS
        .iter()
        .any(|a| input.contains(a) && pattern.contains(a))
    {
        score = (score * ACTION_BOOST).min(1.0);
    }

    let unmatched = input_words
        .iter()
        .filter(|iw| {
            !pattern_words
                .iter()
                .any(|pw| iw == &pw || iw.contains(pw) || pw.contains(*iw))
        })
        .count();
    if unmatched > MAX_UNMATCHED_WORDS {
        score *= UNMATCHED_PENALTY;
    }

    score
}

/// Linear scan scorer over a fixed mapping table
#[derive(Debug, Clone)]
pub struct IntentMapper {
    mappings: &'static [IntentMapping],
}

impl Default for IntentMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentMapper {
    pub fn new() -> Self {
        Self::with_mappings(DEFAULT_MAPPINGS)
    }

    pub fn with_mappings(mappings: &'static [IntentMapping]) -> Self {
        Self { mappings }
    }

    pub fn all_mappings(&self) -> &'static [IntentMapping] {
        self.mappings
    }

    /// Best mapping scoring above [`SUGGESTION_THRESHOLD`]; first registered wins ties
    pub fn map_intent(&self, input: &str) -> Option<MatchResult> {
        let mut best: Option<(&IntentMapping, f64)> = None;

        for (mapping, score) in self.scored(input) {
            if score > SUGGESTION_THRESHOLD && best.is_none_or(|(_, b)| score > b) {
                best = Some((mapping, score));
            }
        }

        let result = best.map(|(m, score)| MatchResult::from_mapping(m, score));
        debug!(
            input = %input,
            make_target = result.as_ref().map(|r| r.make_target.as_str()).unwrap_or("none"),
            "Intent mapped"
        );
        result
    }

    /// Up to five mappings scoring above 0.3, highest first
    pub fn get_suggestions(&self, input: &str) -> Vec<MatchResult> {
        let mut scored: Vec<(&IntentMapping, f64)> = self
            .scored(input)
            .filter(|(_, score)| *score > MIN_SUGGESTION_CONFIDENCE)
            .collect();

        // Stable sort keeps registration order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(MAX_SUGGESTIONS);

        scored
            .into_iter()
            .map(|(m, score)| MatchResult::from_mapping(m, score))
            .collect()
    }

    fn scored<'a>(&'a self, input: &str) -> impl Iterator<Item = (&'a IntentMapping, f64)> {
        let normalized = input.trim().to_lowercase();
        self.mappings.iter().map(move |mapping| {
            let score = best_pattern_score(&normalized, mapping);
            (mapping, score)
        })
    }
}

fn best_pattern_score(input: &str, mapping: &IntentMapping) -> f64 {
    let mut best = 0.0_f64;
    for pattern in mapping.patterns {
        let score = calculate_confidence(input, pattern);
        if score > best {
            best = score;
        }
        if score >= 1.0 {
            break;
        }
    }
    best
}
