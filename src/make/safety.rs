// src/make/safety.rs
// Pre-spawn safety gate and argument validation

use crate::config::SafetyRules;
use crate::error::{BridgeError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Targets that always need `confirm: true`
pub const DANGEROUS_TARGETS: &[&str] = &["db-reset", "db-drop", "docker-down-v", "production-deploy"];

static ARG_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: This is a static literal regex pattern; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("argument key regex")
});

/// Rules may be written as full commands ("make db-drop")
fn strip_make_prefix(rule: &str) -> &str {
    rule.strip_prefix("make ").unwrap_or(rule).trim()
}

/// Decide whether `target` may run. `Err` carries the user-facing reason.
pub fn validate_safety(rules: &SafetyRules, target: &str, confirm: bool) -> std::result::Result<(), String> {
    if rules
        .forbidden
        .iter()
        .map(|r| strip_make_prefix(r))
        .any(|r| !r.is_empty() && r == target)
    {
        return Err(format!("Command '{target}' is forbidden by safety rules"));
    }

    if rules
        .block_commands
        .iter()
        .map(|r| strip_make_prefix(r))
        .any(|r| !r.is_empty() && target.contains(r))
    {
        return Err(format!("Command '{target}' is blocked by safety rules"));
    }

    if DANGEROUS_TARGETS.contains(&target) && !confirm {
        return Err(format!(
            "Command '{target}' requires explicit confirmation (set confirm: true)"
        ));
    }

    if !confirm
        && rules
            .require_confirmation
            .iter()
            .map(|r| strip_make_prefix(r))
            .any(|r| !r.is_empty() && target.contains(r))
    {
        return Err(format!("Command '{target}' requires confirmation (set confirm: true)"));
    }

    Ok(())
}

/// Targets are passed to make as a single argv element, so reject anything
/// make would read as an option or a variable assignment.
pub fn validate_target_name(target: &str) -> Result<()> {
    if target.is_empty() {
        return Err(BridgeError::InvalidInput("target must not be empty".into()));
    }
    if target.starts_with('-') {
        return Err(BridgeError::InvalidInput(format!(
            "target '{target}' must not start with '-'"
        )));
    }
    if target.chars().any(|c| c.is_whitespace() || c == '=') {
        return Err(BridgeError::InvalidInput(format!(
            "target '{target}' must not contain whitespace or '='"
        )));
    }
    Ok(())
}

/// Turn caller-supplied JSON args into ordered `KEY=value` pairs.
/// Nulls are skipped; non-string scalars use their JSON text.
pub fn normalize_args(args: &BTreeMap<String, Value>) -> Result<Vec<(String, String)>> {
    let mut out = Vec::with_capacity(args.len());
    for (key, value) in args {
        if !ARG_KEY_RE.is_match(key) {
            return Err(BridgeError::InvalidInput(format!(
                "argument name '{key}' must match [A-Za-z_][A-Za-z0-9_]*"
            )));
        }
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push((key.clone(), value));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(block: &[&str], confirm: &[&str], forbidden: &[&str]) -> SafetyRules {
        SafetyRules {
            block_commands: block.iter().map(|s| s.to_string()).collect(),
            require_confirmation: confirm.iter().map(|s| s.to_string()).collect(),
            forbidden: forbidden.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_dangerous_requires_confirm() {
        let empty = SafetyRules::default();
        let err = validate_safety(&empty, "db-reset", false).unwrap_err();
        assert!(err.contains("requires explicit confirmation"));
        assert!(validate_safety(&empty, "db-reset", true).is_ok());
    }

    #[test]
    fn test_dangerous_set_is_exact() {
        let empty = SafetyRules::default();
        assert!(validate_safety(&empty, "db-reset-docs", false).is_ok());
    }

    #[test]
    fn test_block_rule_strips_make_prefix_and_matches_substring() {
        let r = rules(&["make docker-prune"], &[], &[]);
        let err = validate_safety(&r, "docker-prune-all", true).unwrap_err();
        assert!(err.contains("blocked"));
    }

    #[test]
    fn test_block_wins_over_confirm() {
        let r = rules(&["db-reset"], &[], &[]);
        assert!(validate_safety(&r, "db-reset", true).unwrap_err().contains("blocked"));
    }

    #[test]
    fn test_require_confirmation_rule() {
        let r = rules(&[], &["financial"], &[]);
        assert!(validate_safety(&r, "financial-sync", false).is_err());
        assert!(validate_safety(&r, "financial-sync", true).is_ok());
        assert!(validate_safety(&r, "dev-up", false).is_ok());
    }

    #[test]
    fn test_forbidden_is_exact_name() {
        let r = rules(&[], &[], &["make nuke"]);
        assert!(validate_safety(&r, "nuke", true).unwrap_err().contains("forbidden"));
        assert!(validate_safety(&r, "nuke-docs", false).is_ok());
    }

    #[test]
    fn test_empty_rules_are_ignored() {
        let r = rules(&["", "make "], &[""], &[""]);
        assert!(validate_safety(&r, "dev-up", false).is_ok());
    }

    #[test]
    fn test_target_name_validation() {
        assert!(validate_target_name("dev-up").is_ok());
        assert!(validate_target_name("build/frontend").is_ok());
        assert!(validate_target_name("").is_err());
        assert!(validate_target_name("--eval=x").is_err());
        assert!(validate_target_name("a b").is_err());
        assert!(validate_target_name("X=1").is_err());
    }

    #[test]
    fn test_normalize_args() {
        let args: BTreeMap<String, Value> = serde_json::from_value(json!({
            "NAME": "add_users",
            "COUNT": 3,
            "DRY": true,
            "SKIP": null
        }))
        .unwrap();
        let normalized = normalize_args(&args).unwrap();
        assert_eq!(
            normalized,
            vec![
                ("COUNT".to_string(), "3".to_string()),
                ("DRY".to_string(), "true".to_string()),
                ("NAME".to_string(), "add_users".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_arg_key_rejected() {
        let mut args = BTreeMap::new();
        args.insert("BAD KEY".to_string(), json!("x"));
        assert!(matches!(
            normalize_args(&args),
            Err(BridgeError::InvalidInput(_))
        ));

        let mut args = BTreeMap::new();
        args.insert("1ABC".to_string(), json!("x"));
        assert!(normalize_args(&args).is_err());
    }
}
