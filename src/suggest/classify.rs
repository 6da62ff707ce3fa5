// src/suggest/classify.rs
// Ordered keyword rules for safety level, priority and auto-execution

use super::{Priority, SafetyLevel};

/// Evaluated top to bottom; the first rule with a matching keyword wins.
const SAFETY_RULES: &[(&[&str], SafetyLevel)] = &[
    (
        &[
            "reset", "drop", "delete", "destroy", "prune", "force", "dev-down",
            "production-deploy",
        ],
        SafetyLevel::Dangerous,
    ),
    (
        &["status", "check", "list", "help", "show", "view", "logs", "health"],
        SafetyLevel::Safe,
    ),
    (
        &["migrate", "sync", "backup", "deploy", "trading-up", "dev-refresh"],
        SafetyLevel::Warning,
    ),
];

/// Lower bounds (exclusive) for confidence bands, highest first
const PRIORITY_BANDS: &[(f64, Priority)] = &[
    (0.9, Priority::High),
    (0.7, Priority::High),
    (0.5, Priority::Medium),
];

/// Targets that never mutate anything
pub const AUTO_EXECUTE_ALLOW_LIST: &[&str] = &[
    "dev-status",
    "db-migrate-status",
    "check-db",
    "health",
    "trading-status",
    "mcp-status",
    "auth-token",
];

pub const READ_ONLY_KEYWORDS: &[&str] = &["status", "check", "list", "help", "show", "view", "logs"];

pub fn assess_safety_level(make_target: &str) -> SafetyLevel {
    SAFETY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| make_target.contains(k)))
        .map(|(_, level)| *level)
        .unwrap_or(SafetyLevel::Safe)
}

pub fn priority_for_confidence(confidence: f64) -> Priority {
    PRIORITY_BANDS
        .iter()
        .find(|(floor, _)| confidence > *floor)
        .map(|(_, priority)| *priority)
        .unwrap_or(Priority::Low)
}

pub fn is_safe_for_auto_execution(make_target: &str) -> bool {
    AUTO_EXECUTE_ALLOW_LIST.contains(&make_target)
        || READ_ONLY_KEYWORDS.iter().any(|k| make_target.contains(k))
}
