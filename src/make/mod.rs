// src/make/mod.rs
// Make command bridge: safety gate, execution, target discovery, probes

mod bridge;
mod locks;
mod probe;
mod runner;
mod safety;
mod targets;
mod workflow;

pub use bridge::{MakeCommandBridge, OUTER_TIMEOUT_SLACK};
pub use locks::CategoryLocks;
pub use probe::{DATABASE_CHECK_TIMEOUT, HEALTH_PING_TIMEOUT, ServiceKind, ServiceStatus};
pub use runner::{CommandRunner, DEFAULT_EXEC_TIMEOUT, MakeInvocation, ProcessRunner, RunOutput};
pub use safety::{DANGEROUS_TARGETS, normalize_args, validate_safety, validate_target_name};
pub use targets::{
    MAX_TARGETS, MakeTarget, TargetCategory, assess_target_safety, categorize_target,
    discover_targets, parse_makefile,
};
pub use workflow::{
    AUTO_RUN_DIRECT_THRESHOLD, AUTO_RUN_SUGGESTION_THRESHOLD, ActionKind, CheckFirstResponse,
    CommandHint, CommandSuggestionsResponse, ContextInfo, IntentAnalysis, IntentAnalysisResponse,
    RecommendedAction, SuggestionView,
};

use serde::Serialize;

/// Outcome of one `execute_make_command` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeCommandResult {
    pub success: bool,
    /// stdout, then stderr under an `STDERR:` marker
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds
    pub duration: u64,
    /// Display form of what ran, e.g. `make db-migrate`
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetHelp {
    pub target: String,
    pub description: String,
    pub usage: String,
    /// `safe`, `warning`, `dangerous`, or `unknown` when the target is not annotated
    pub safety: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteReport {
    pub valid: bool,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
}

/// Join captured streams the way callers see them
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        stdout.to_string()
    } else {
        format!("{stdout}\nSTDERR:\n{stderr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_output() {
        assert_eq!(combine_output("ok\n", ""), "ok\n");
        assert_eq!(combine_output("ok", "warn"), "ok\nSTDERR:\nwarn");
    }

    #[test]
    fn test_result_serialization_skips_missing_error() {
        let result = MakeCommandResult {
            success: true,
            output: "done".into(),
            error: None,
            duration: 12,
            command: "make test".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["duration"], 12);
    }
}
