// src/suggest/mod.rs
// Contextual command suggestions and the auto-suggestion composer

mod auto;
mod classify;
mod engine;

pub use auto::{
    AUTO_EXECUTE_THRESHOLD, AutoSuggestionEngine, AutoSuggestionResult, ContextualAdvice,
    DIRECT_MAPPING_THRESHOLD, DebugInfo, ENGINE_SUGGESTION_CONFIDENCE, RankedSuggestion,
};
pub use classify::{
    AUTO_EXECUTE_ALLOW_LIST, READ_ONLY_KEYWORDS, assess_safety_level, is_safe_for_auto_execution,
    priority_for_confidence,
};
pub use engine::{CommandSuggestionEngine, MAX_CONTEXT_HISTORY};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Warning,
    Dangerous,
}

impl SafetyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "safe",
            SafetyLevel::Warning => "warning",
            SafetyLevel::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

/// A make target proposed by the rule-based engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub command: String,
    pub reason: String,
    pub priority: Priority,
    pub category: String,
    pub safety_level: SafetyLevel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

/// Caller-declared project flags. `None` means unknown and triggers nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[schemars(description = "Whether development services are running")]
    pub services_running: Option<bool>,
    #[schemars(description = "Whether the database is reachable")]
    pub database_connected: Option<bool>,
    #[schemars(description = "Whether all migrations are applied")]
    pub migrations_applied: Option<bool>,
    #[schemars(description = "Whether the test suite passes")]
    #[serde(alias = "testsPassing")]
    pub tests_passings: Option<bool>,
}

/// Signals fed to [`CommandSuggestionEngine::get_suggestions`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionContext {
    pub current_directory: Option<PathBuf>,
    pub recent_commands: Vec<String>,
    pub file_types: Vec<String>,
    pub project_state: Option<ProjectState>,
    pub user_intent: Option<String>,
}

impl SuggestionContext {
    pub fn from_intent(intent: impl Into<String>) -> Self {
        Self {
            user_intent: Some(intent.into()),
            ..Default::default()
        }
    }
}
