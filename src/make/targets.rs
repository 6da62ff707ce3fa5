// src/make/targets.rs
// Makefile target discovery from `target: ## description` annotations

use crate::error::{BridgeError, Result};
use crate::suggest::SafetyLevel;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// At most this many annotated targets are reported
pub const MAX_TARGETS: usize = 100;

/// `name: [deps] ## description`; `:=` assignments are excluded
static TARGET_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: This is a static literal regex pattern; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^([A-Za-z0-9_-]+)\s*:(?:[^=#][^#]*)?##\s*(.+?)\s*$").expect("target line regex")
});

/// Evaluated in order; unmatched targets are `utility`
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["dev-", "build", "install"], "development"),
    (&["db-", "migrate", "schema"], "database"),
    (&["test"], "testing"),
    (&["lint", "typecheck", "format"], "quality"),
    (&["deploy", "production", "docker"], "deployment"),
    (&["financial", "invoice", "client"], "financial"),
    (&["trading", "market"], "trading"),
    (&["mcp-"], "mcp"),
];

const TARGET_SAFETY_RULES: &[(&[&str], SafetyLevel)] = &[
    (
        &["reset", "drop", "delete", "destroy", "prune", "force"],
        SafetyLevel::Dangerous,
    ),
    (
        &["deploy", "production", "migrate", "backup"],
        SafetyLevel::Warning,
    ),
];

/// Category filter accepted by target listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetCategory {
    Development,
    Database,
    Testing,
    Quality,
    Deployment,
    Financial,
    Trading,
    Mcp,
    Utility,
    All,
}

impl TargetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCategory::Development => "development",
            TargetCategory::Database => "database",
            TargetCategory::Testing => "testing",
            TargetCategory::Quality => "quality",
            TargetCategory::Deployment => "deployment",
            TargetCategory::Financial => "financial",
            TargetCategory::Trading => "trading",
            TargetCategory::Mcp => "mcp",
            TargetCategory::Utility => "utility",
            TargetCategory::All => "all",
        }
    }
}

impl std::str::FromStr for TargetCategory {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
            .map_err(|_| BridgeError::InvalidInput(format!("unknown target category '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeTarget {
    pub name: String,
    pub description: String,
    pub category: String,
    pub safety: SafetyLevel,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

pub fn categorize_target(target: &str) -> &'static str {
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| target.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or("utility")
}

pub fn assess_target_safety(target: &str) -> SafetyLevel {
    TARGET_SAFETY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| target.contains(k)))
        .map(|(_, level)| *level)
        .unwrap_or(SafetyLevel::Safe)
}

/// Extract annotated targets from Makefile text, first definition wins
pub fn parse_makefile(contents: &str) -> Vec<MakeTarget> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .filter_map(|line| TARGET_LINE_RE.captures(line))
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let description = caps.get(2)?.as_str();
            seen.insert(name.to_string()).then(|| MakeTarget {
                name: name.to_string(),
                description: description.to_string(),
                category: categorize_target(name).to_string(),
                safety: assess_target_safety(name),
                prerequisites: Vec::new(),
            })
        })
        .collect()
}

/// Read every `Makefile*` in the project root, in name order
pub fn discover_targets(project_root: &Path) -> Result<Vec<MakeTarget>> {
    let pattern = project_root.join("Makefile*");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| BridgeError::Config(format!("non UTF-8 project root: {}", project_root.display())))?;

    let mut paths: Vec<_> = glob::glob(pattern)
        .map_err(|e| BridgeError::Config(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for path in &paths {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable Makefile");
                continue;
            }
        };
        for target in parse_makefile(&contents) {
            if seen.insert(target.name.clone()) {
                targets.push(target);
            }
        }
    }
    targets.truncate(MAX_TARGETS);

    debug!(files = paths.len(), targets = targets.len(), "Parsed Makefile targets");
    Ok(targets)
}
