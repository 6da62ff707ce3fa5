// src/suggest/auto.rs
// Composes phrase mapping and rule suggestions into a single ranked answer

use super::{
    CommandSuggestionEngine, Priority, ProjectState, SafetyLevel, SuggestionContext,
    assess_safety_level, is_safe_for_auto_execution, priority_for_confidence,
};
use crate::intent::{IntentMapper, MatchResult};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// A mapped intent counts as a direct hit only above this
pub const DIRECT_MAPPING_THRESHOLD: f64 = 0.8;

/// A direct hit may run without asking only above this
pub const AUTO_EXECUTE_THRESHOLD: f64 = 0.9;

/// Rule-engine suggestions have no score of their own
pub const ENGINE_SUGGESTION_CONFIDENCE: f64 = 0.7;

const MAX_RANKED: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSuggestion {
    pub make_target: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub safety_level: SafetyLevel,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualAdvice {
    pub category: &'static str,
    pub workflow: &'static [&'static str],
    pub next_steps: &'static [&'static str],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSuggestionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_mapping: Option<MatchResult>,
    pub suggestions: Vec<RankedSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contextual_advice: Option<ContextualAdvice>,
    pub should_execute_directly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub mappings_count: usize,
    pub available_commands: Vec<String>,
}

/// Input keywords that select a workflow; first match wins
const ADVICE_RULES: &[(&[&str], ContextualAdvice)] = &[
    (
        &["database", "migration", "db"],
        ContextualAdvice {
            category: "database",
            workflow: &[
                "Check development environment status",
                "Verify database connectivity",
                "Check migration status",
                "Create backup before changes",
                "Apply migrations if needed",
            ],
            next_steps: &["dev-status", "check-db", "db-migrate-status"],
        },
    ),
    (
        &["trading", "crypto", "market"],
        ContextualAdvice {
            category: "trading",
            workflow: &[
                "Verify API keys are configured",
                "Check development environment",
                "Start trading services",
                "Monitor trading status",
            ],
            next_steps: &["dev-status", "trading-status", "trading-up"],
        },
    ),
    (
        &["quality", "test", "validate"],
        ContextualAdvice {
            category: "quality",
            workflow: &[
                "Run test suite",
                "Validate TypeScript types",
                "Check code style",
                "Comprehensive health check",
            ],
            next_steps: &["test", "typecheck", "lint", "health"],
        },
    ),
    (
        &["deploy", "production", "release"],
        ContextualAdvice {
            category: "deployment",
            workflow: &[
                "Run comprehensive quality checks",
                "Validate system health",
                "Create backups",
                "Execute deployment",
            ],
            next_steps: &["test", "health", "db-backup"],
        },
    ),
];

pub fn contextual_advice(input: &str) -> Option<ContextualAdvice> {
    let lower = input.to_lowercase();
    ADVICE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, advice)| advice.clone())
}

pub struct AutoSuggestionEngine {
    mapper: IntentMapper,
    engine: Arc<CommandSuggestionEngine>,
}

impl Default for AutoSuggestionEngine {
    fn default() -> Self {
        Self::new(IntentMapper::new(), Arc::new(CommandSuggestionEngine::new()))
    }
}

impl AutoSuggestionEngine {
    pub fn new(mapper: IntentMapper, engine: Arc<CommandSuggestionEngine>) -> Self {
        Self { mapper, engine }
    }

    pub fn mapper(&self) -> &IntentMapper {
        &self.mapper
    }

    pub async fn analyze_intent(
        &self,
        user_input: &str,
        project_state: Option<ProjectState>,
    ) -> AutoSuggestionResult {
        info!(input = %user_input, "Analyzing user intent");

        let direct_mapping = self
            .mapper
            .map_intent(user_input)
            .filter(|m| m.confidence > DIRECT_MAPPING_THRESHOLD);

        let should_execute_directly = direct_mapping.as_ref().is_some_and(|m| {
            m.confidence > AUTO_EXECUTE_THRESHOLD
                && !m.confirm
                && is_safe_for_auto_execution(&m.make_target)
        });

        let mut ranked: Vec<RankedSuggestion> = self
            .mapper
            .get_suggestions(user_input)
            .into_iter()
            .map(|m| RankedSuggestion {
                priority: priority_for_confidence(m.confidence),
                safety_level: assess_safety_level(&m.make_target),
                make_target: m.make_target,
                description: m.description,
                category: m.category,
                confidence: m.confidence,
            })
            .collect();

        let context = SuggestionContext {
            user_intent: Some(user_input.to_string()),
            project_state,
            current_directory: std::env::current_dir().ok(),
            ..Default::default()
        };
        ranked.extend(
            self.engine
                .get_suggestions(&context)
                .await
                .into_iter()
                .map(|s| RankedSuggestion {
                    make_target: s.command,
                    description: s.reason,
                    priority: s.priority,
                    category: s.category,
                    safety_level: s.safety_level,
                    confidence: ENGINE_SUGGESTION_CONFIDENCE,
                }),
        );

        let result = AutoSuggestionResult {
            direct_mapping,
            suggestions: dedupe_and_rank(ranked),
            contextual_advice: contextual_advice(user_input),
            should_execute_directly,
        };

        info!(
            direct_mapping = result.direct_mapping.is_some(),
            suggestions = result.suggestions.len(),
            should_execute_directly = result.should_execute_directly,
            "Intent analysis complete"
        );
        result
    }

    /// Outcome report for a mapped input. Only logged for now.
    pub fn learn_from_execution(&self, user_input: &str, executed_command: &str, success: bool) {
        if success {
            debug!(
                input = %user_input,
                command = %executed_command,
                "Learning from successful execution"
            );
        }
    }

    pub fn debug_info(&self) -> DebugInfo {
        let mappings = self.mapper.all_mappings();
        let mut seen = HashSet::new();
        DebugInfo {
            mappings_count: mappings.len(),
            available_commands: mappings
                .iter()
                .filter(|m| seen.insert(m.make_target))
                .map(|m| m.make_target.to_string())
                .collect(),
        }
    }
}

/// First occurrence per target wins; confidence descending, then priority
fn dedupe_and_rank(suggestions: Vec<RankedSuggestion>) -> Vec<RankedSuggestion> {
    let mut seen = HashSet::new();
    let mut unique: Vec<RankedSuggestion> = suggestions
        .into_iter()
        .filter(|s| seen.insert(s.make_target.clone()))
        .collect();

    unique.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.priority.cmp(&a.priority))
    });
    unique.truncate(MAX_RANKED);
    unique
}
