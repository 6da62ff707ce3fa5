// src/suggest/engine.rs
// Rule-based command suggestions from intent keywords, project state and recent commands

use super::{Priority, ProjectState, SafetyLevel, Suggestion, SuggestionContext};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tracing::debug;

/// Contexts retained for future learning
pub const MAX_CONTEXT_HISTORY: usize = 10;

const MAX_RESULTS: usize = 5;

struct Template {
    command: &'static str,
    reason: &'static str,
    priority: Priority,
    category: &'static str,
    safety: SafetyLevel,
    prerequisites: &'static [&'static str],
}

impl Template {
    fn to_suggestion(&self) -> Suggestion {
        Suggestion {
            command: self.command.to_string(),
            reason: self.reason.to_string(),
            priority: self.priority,
            category: self.category.to_string(),
            safety_level: self.safety,
            prerequisites: self.prerequisites.iter().map(|p| p.to_string()).collect(),
        }
    }
}

const fn template(
    command: &'static str,
    reason: &'static str,
    priority: Priority,
    category: &'static str,
    safety: SafetyLevel,
    prerequisites: &'static [&'static str],
) -> Template {
    Template {
        command,
        reason,
        priority,
        category,
        safety,
        prerequisites,
    }
}

use Priority::{High, Medium};
use SafetyLevel::{Dangerous, Safe, Warning};

/// Fires when the lowercased intent contains any keyword
const INTENT_RULES: &[(&[&str], &[Template])] = &[
    (
        &["start", "begin", "develop"],
        &[
            template("dev-up", "Start development environment", High, "development", Safe, &[]),
            template("dev-status", "Check if services are running", Medium, "development", Safe, &[]),
        ],
    ),
    (
        &["database", "migration", "schema"],
        &[
            template("db-migrate-status", "Check current migration status", High, "database", Safe, &[]),
            template(
                "db-backup",
                "Create backup before changes",
                High,
                "database",
                Warning,
                &["AI Service running"],
            ),
        ],
    ),
    (
        &["test", "quality", "check"],
        &[
            template("test", "Run test suite", High, "quality", Safe, &[]),
            template("typecheck", "Validate TypeScript types", Medium, "quality", Safe, &[]),
        ],
    ),
    (
        &["financial", "invoice", "client"],
        &[
            template("financial-validate", "Validate financial data integrity", High, "financial", Safe, &[]),
            template(
                "financial-sync",
                "Sync financial data from production",
                Medium,
                "financial",
                Warning,
                &["Database backup", "Production access"],
            ),
        ],
    ),
    (
        &["trading", "market", "crypto"],
        &[
            template("trading-status", "Check trading services status", High, "trading", Safe, &[]),
            template(
                "trading-up",
                "Start trading services",
                Medium,
                "trading",
                Warning,
                &["API keys configured"],
            ),
        ],
    ),
    (
        &["deploy", "production", "release"],
        &[
            template("health", "Validate system health before deployment", High, "deployment", Safe, &[]),
            template(
                "deploy-safe",
                "Safe deployment with validations",
                Medium,
                "deployment",
                Dangerous,
                &["Tests passing", "Build successful", "Health checks pass"],
            ),
        ],
    ),
];

/// Fires when the declared flag is explicitly false
const STATE_RULES: &[(fn(&ProjectState) -> Option<bool>, &[Template])] = &[
    (
        |s| s.services_running,
        &[template("dev-up", "Services appear to be down", High, "development", Safe, &[])],
    ),
    (
        |s| s.database_connected,
        &[template("check-db", "Database connectivity issues detected", High, "database", Safe, &[])],
    ),
    (
        |s| s.migrations_applied,
        &[
            template("db-migrate-status", "Check for pending migrations", High, "database", Safe, &[]),
            template(
                "db-migrate",
                "Apply pending migrations",
                Medium,
                "database",
                Warning,
                &["Database backup"],
            ),
        ],
    ),
    (
        |s| s.tests_passings,
        &[
            template("test", "Fix failing tests", High, "quality", Safe, &[]),
            template("typecheck", "Check for type errors", Medium, "quality", Safe, &[]),
        ],
    ),
];

/// Fires when the predicate holds over recent commands
const WORKFLOW_RULES: &[(fn(&[String]) -> bool, Template)] = &[
    (
        |recent| recent.iter().any(|c| c == "dev-up"),
        template("dev-status", "Verify services started correctly", Medium, "development", Safe, &[]),
    ),
    (
        |recent| recent.iter().any(|c| c.contains("db-migrate-create")),
        template(
            "db-migrate",
            "Apply the newly created migration",
            High,
            "database",
            Warning,
            &["Database backup"],
        ),
    ),
    (
        |recent| recent.iter().any(|c| c.contains("edit") || c.contains("create")),
        template("test", "Validate changes with tests", Medium, "quality", Safe, &[]),
    ),
    (
        |recent| recent.iter().any(|c| c.contains("deploy")),
        template("health", "Final health check before deployment", High, "deployment", Safe, &[]),
    ),
];

/// Known targets per category
const CATEGORY_COMMANDS: &[(&str, &[&str])] = &[
    ("development", &["dev-up", "dev-down", "dev-refresh", "dev-status"]),
    ("database", &["db-migrate", "db-backup", "db-migrate-status", "check-db"]),
    ("testing", &["test", "typecheck", "lint", "health"]),
    ("financial", &["financial-sync", "financial-validate", "financial-backup"]),
    ("trading", &["trading-up", "trading-status", "trading-positions"]),
    ("deployment", &["deploy-safe", "health", "production-status"]),
];

/// Proposes make targets from contextual signals, independent of phrase scoring
#[derive(Default)]
pub struct CommandSuggestionEngine {
    history: Mutex<VecDeque<SuggestionContext>>,
}

impl CommandSuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deduplicated suggestions, highest priority first, at most five
    pub async fn get_suggestions(&self, context: &SuggestionContext) -> Vec<Suggestion> {
        self.remember(context);

        let mut suggestions = Vec::new();
        if let Some(intent) = &context.user_intent {
            suggestions.extend(intent_suggestions(intent));
        }
        if let Some(state) = &context.project_state {
            suggestions.extend(state_suggestions(state));
        }
        suggestions.extend(workflow_suggestions(&context.recent_commands));

        let result = dedupe_and_rank(suggestions);
        debug!(
            count = result.len(),
            intent = context.user_intent.as_deref().unwrap_or(""),
            "Generated command suggestions"
        );
        result
    }

    /// Read-only view of the category table
    pub fn known_commands(&self, category: &str) -> Option<&'static [&'static str]> {
        CATEGORY_COMMANDS
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, commands)| *commands)
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Outcome report from the bridge. Only logged for now.
    pub fn learn_from_execution(&self, command: &str, context: &SuggestionContext, success: bool) {
        if success {
            debug!(
                command,
                intent = context.user_intent.as_deref().unwrap_or(""),
                "Learning from successful command execution"
            );
        }
    }

    fn remember(&self, context: &SuggestionContext) {
        if let Ok(mut history) = self.history.lock() {
            history.push_back(context.clone());
            while history.len() > MAX_CONTEXT_HISTORY {
                history.pop_front();
            }
        }
    }
}

fn intent_suggestions(intent: &str) -> impl Iterator<Item = Suggestion> {
    let lower = intent.to_lowercase();
    INTENT_RULES
        .iter()
        .filter(move |(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .flat_map(|(_, templates)| templates.iter().map(Template::to_suggestion))
}

fn state_suggestions(state: &ProjectState) -> Vec<Suggestion> {
    STATE_RULES
        .iter()
        .filter(|(flag, _)| flag(state) == Some(false))
        .flat_map(|(_, templates)| templates.iter().map(Template::to_suggestion))
        .collect()
}

fn workflow_suggestions(recent: &[String]) -> Vec<Suggestion> {
    WORKFLOW_RULES
        .iter()
        .filter(|(fires, _)| fires(recent))
        .map(|(_, t)| t.to_suggestion())
        .collect()
}

/// First occurrence of each command wins, then a stable sort by priority
fn dedupe_and_rank(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Suggestion> = suggestions
        .into_iter()
        .filter(|s| seen.insert(s.command.clone()))
        .collect();

    unique.sort_by(|a, b| b.priority.cmp(&a.priority));
    unique.truncate(MAX_RESULTS);
    unique
}
