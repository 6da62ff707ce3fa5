// tests/bridge_test.rs
// MakeCommandBridge integration tests
//
// Tests:
// 1. Safety gate: dangerous targets never reach the runner without confirm
// 2. .clauderc rules loaded from the project root
// 3. Argument validation and argv construction
// 4. Execution time bound: hanging runners, category lock waits, partial output
// 5. Target listing cache and TTL expiry
// 6. check_make_commands_first auto-execution, confirmation and fallback help
// 7. Per-category serialization of mutating targets

use async_trait::async_trait;
use devbridge::make::{
    CommandRunner, MakeCommandBridge, MakeInvocation, ProcessRunner, RunOutput, TargetCategory,
};
use devbridge::Result;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// TEST SETUP
// ============================================================================

const MAKEFILE: &str = "\
.PHONY: dev-up dev-status db-migrate db-reset test

dev-up: ## Start development environment
\tdocker compose up -d

dev-status: ## Check development environment status
\tdocker compose ps

db-migrate: dev-up ## Apply pending migrations
\t./scripts/migrate.sh

db-reset: ## Drop and recreate the database
\t./scripts/reset.sh

test: ## Run the test suite
\tcargo test
";

/// Records every invocation instead of spawning a process
#[derive(Default)]
struct SpyRunner {
    calls: Mutex<Vec<Vec<String>>>,
    delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl SpyRunner {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for SpyRunner {
    async fn run(&self, invocation: &MakeInvocation, _timeout: Duration) -> Result<RunOutput> {
        self.calls.lock().unwrap().push(invocation.argv());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        Ok(RunOutput {
            exit_code: Some(0),
            stdout: format!("ran {}\n", invocation.target),
            stderr: String::new(),
            timed_out: false,
        })
    }
}

/// Never finishes and ignores its timeout
struct HangingRunner;

#[async_trait]
impl CommandRunner for HangingRunner {
    async fn run(&self, _invocation: &MakeInvocation, _timeout: Duration) -> Result<RunOutput> {
        std::future::pending().await
    }
}

fn project(clauderc: Option<&str>) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("Makefile"), MAKEFILE).unwrap();
    if let Some(rc) = clauderc {
        std::fs::write(dir.path().join(".clauderc"), rc).unwrap();
    }
    dir
}

fn bridge_with(dir: &TempDir, runner: Arc<dyn CommandRunner>) -> MakeCommandBridge {
    MakeCommandBridge::new(dir.path())
        .with_runner(runner)
        // Closed port: health pings fail fast without network
        .with_health_url("http://127.0.0.1:9/api/health")
}

fn no_args() -> BTreeMap<String, Value> {
    BTreeMap::new()
}

// ============================================================================
// SAFETY GATE
// ============================================================================

#[tokio::test]
async fn test_db_reset_without_confirm_never_spawns() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let result = bridge.execute_make_command("db-reset", &no_args(), false).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("requires explicit confirmation"));
    assert_eq!(result.command, "make db-reset");
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_db_reset_with_confirm_spawns() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let result = bridge.execute_make_command("db-reset", &no_args(), true).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.output, "ran db-reset\n");
    assert_eq!(spy.calls(), vec![vec!["db-reset".to_string()]]);
}

#[tokio::test]
async fn test_clauderc_rules_are_enforced() {
    let dir = project(Some(
        r#"{
            "safetyRules": {
                "blockCommands": ["trading"],
                "requireConfirmation": ["make db-migrate"],
                "forbidden": ["nuke"]
            },
            "unrelated": true
        }"#,
    ));
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());
    assert_eq!(bridge.safety_rules().block_commands, vec!["trading"]);

    let blocked = bridge.execute_make_command("trading-up", &no_args(), true).await;
    assert!(blocked.error.as_deref().unwrap().contains("blocked by safety rules"));

    let forbidden = bridge.execute_make_command("nuke", &no_args(), true).await;
    assert!(forbidden.error.as_deref().unwrap().contains("forbidden"));

    let unconfirmed = bridge.execute_make_command("db-migrate", &no_args(), false).await;
    assert!(unconfirmed.error.as_deref().unwrap().contains("requires confirmation"));
    assert!(spy.calls().is_empty());

    let confirmed = bridge.execute_make_command("db-migrate", &no_args(), true).await;
    assert!(confirmed.success);
    assert_eq!(spy.calls().len(), 1);
}

#[tokio::test]
async fn test_malformed_clauderc_is_permissive() {
    let dir = project(Some("{ not json"));
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    assert!(bridge.safety_rules().is_empty());
    let result = bridge.execute_make_command("test", &no_args(), false).await;
    assert!(result.success);
}

// ============================================================================
// ARGUMENTS
// ============================================================================

#[tokio::test]
async fn test_args_passed_as_argv() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let args = BTreeMap::from([
        ("NAME".to_string(), json!("add_users; rm -rf /")),
        ("STEPS".to_string(), json!(2)),
    ]);
    let result = bridge.execute_make_command("db-migrate-create", &args, false).await;

    assert!(result.success);
    assert_eq!(
        result.command,
        r#"make db-migrate-create NAME="add_users; rm -rf /" STEPS="2""#
    );
    assert_eq!(
        spy.calls(),
        vec![vec![
            "db-migrate-create".to_string(),
            "NAME=add_users; rm -rf /".to_string(),
            "STEPS=2".to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_invalid_arg_key_rejected_before_spawn() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let args = BTreeMap::from([("BAD-KEY".to_string(), json!("x"))]);
    let result = bridge.execute_make_command("test", &args, false).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("BAD-KEY"));
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_option_like_target_rejected() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    for target in ["-f/etc/passwd", "", "a b", "X=1"] {
        let result = bridge.execute_make_command(target, &no_args(), true).await;
        assert!(!result.success, "{target:?} accepted");
    }
    assert!(spy.calls().is_empty());
}

// ============================================================================
// TIME BOUND
// ============================================================================

#[tokio::test]
async fn test_hanging_runner_times_out() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(HangingRunner)).with_exec_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let result = bridge.execute_make_command("test", &no_args(), false).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_lock_wait_counts_against_the_time_bound() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(HangingRunner)).with_exec_timeout(Duration::from_millis(500));

    let queued = async {
        let started = std::time::Instant::now();
        let result = bridge.execute_make_command("db-migrate", &no_args(), false).await;
        (result, started.elapsed())
    };
    let args = no_args();
    let (running, (queued, waited)) = tokio::join!(
        bridge.execute_make_command("db-migrate", &args, false),
        queued,
    );

    // The queued call gives up at its own deadline instead of waiting out the hung one
    assert!(waited < Duration::from_millis(900));
    assert!(!queued.success);
    assert_eq!(
        queued.error.as_deref(),
        Some("`make db-migrate` timed out after 500ms waiting for another database command to finish")
    );
    assert!(!running.success);
    assert_eq!(running.error.as_deref(), Some("`make db-migrate` timed out after 500ms"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_timed_out_command_keeps_partial_output() {
    let dir = project(None);
    std::fs::write(dir.path().join("script.sh"), "echo partial-progress\nsleep 30\n").unwrap();
    let bridge = bridge_with(&dir, Arc::new(ProcessRunner::new("sh")))
        .with_exec_timeout(Duration::from_millis(500));

    let result = bridge.execute_make_command("script.sh", &no_args(), false).await;

    assert!(!result.success);
    assert!(result.output.contains("partial-progress"));
    assert_eq!(
        result.error.as_deref(),
        Some("`make script.sh` timed out after 500ms")
    );
}

// ============================================================================
// TARGET LISTING
// ============================================================================

#[tokio::test]
async fn test_target_cache_hits_within_ttl() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(SpyRunner::default()));

    let first = bridge.list_make_targets(None).await;
    let second = bridge.list_make_targets(None).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
    assert_eq!(bridge.parse_count(), 1);

    // "all" shares the unfiltered entry
    bridge.list_make_targets(Some("all")).await;
    assert_eq!(bridge.parse_count(), 1);

    let database = bridge.list_make_targets(Some("database")).await;
    assert_eq!(bridge.parse_count(), 2);
    assert!(database.iter().all(|t| t.category == "database"));
    assert_eq!(database.len(), 2);
}

#[tokio::test]
async fn test_testing_filter_lists_test_targets() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(SpyRunner::default()));

    let testing = bridge.list_make_targets(Some(TargetCategory::Testing.as_str())).await;
    let names: Vec<&str> = testing.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["test"]);
}

#[tokio::test]
async fn test_target_cache_expires() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(SpyRunner::default())).with_cache_ttl(Duration::from_millis(50));

    bridge.list_make_targets(None).await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    bridge.list_make_targets(None).await;

    assert_eq!(bridge.parse_count(), 2);
}

#[tokio::test]
async fn test_missing_makefile_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge_with(&dir, Arc::new(SpyRunner::default()));
    assert!(bridge.list_make_targets(None).await.is_empty());
}

#[tokio::test]
async fn test_help_for_known_and_unknown_targets() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(SpyRunner::default()));

    let help = bridge.get_make_command_help("db-reset").await;
    assert_eq!(help.description, "Drop and recreate the database");
    assert_eq!(help.safety, "dangerous");
    assert_eq!(help.usage, "make db-reset");

    let missing = bridge.get_make_command_help("nope").await;
    assert_eq!(missing.safety, "unknown");
}

// ============================================================================
// PROBES
// ============================================================================

#[tokio::test]
async fn test_trading_prerequisites_need_env_file() {
    let dir = project(None);
    let bridge = bridge_with(&dir, Arc::new(SpyRunner::default()));

    let report = bridge.validate_make_prerequisites("trading-up").await;
    assert!(!report.valid);
    assert!(report.missing.iter().any(|m| m.contains(".env.local")));

    std::fs::write(dir.path().join(".env.local"), "OTHER=1\n").unwrap();
    let report = bridge.validate_make_prerequisites("trading-up").await;
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn test_status_probes_use_runner() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let statuses = bridge.get_make_command_status(None).await;
    let services: Vec<&str> = statuses.iter().map(|s| s.service.as_str()).collect();
    assert_eq!(services, vec!["development", "database", "mcp", "trading"]);
    assert_eq!(statuses[1].status, "healthy");
    assert_eq!(statuses[1].details["output"], "ran check-db");
    assert_eq!(spy.calls().len(), 4);
}

// ============================================================================
// CHECK FIRST
// ============================================================================

#[tokio::test]
async fn test_check_first_executes_confident_mapping() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let response = bridge.check_make_commands_first("start development", true).await;

    assert!(response.executed);
    assert_eq!(response.command.as_deref(), Some("dev-up"));
    assert!(response.result.as_ref().unwrap().success);
    assert_eq!(spy.calls(), vec![vec!["dev-up".to_string()]]);
}

#[tokio::test]
async fn test_check_first_without_auto_execute_only_suggests() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let response = bridge.check_make_commands_first("start development", false).await;

    assert!(!response.executed);
    assert!(response.suggestions.iter().any(|s| s.command == "make dev-up"));
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_check_first_falls_back_to_help() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    let response = bridge.check_make_commands_first("purple elephant sandwich", true).await;

    assert!(!response.executed);
    let commands: Vec<&str> = response.suggestions.iter().map(|s| s.command.as_str()).collect();
    assert_eq!(commands, vec!["make dev-status", "make dev-up", "make help"]);
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_check_first_never_runs_mappings_that_need_confirmation() {
    let dir = project(Some(r#"{"safetyRules":{"requireConfirmation":["deploy","financial"]}}"#));
    let spy = Arc::new(SpyRunner::default());
    let bridge = bridge_with(&dir, spy.clone());

    for (request, target) in [("deploy", "deploy"), ("sync financial data", "financial-sync")] {
        let response = bridge.check_make_commands_first(request, true).await;
        assert!(!response.executed, "{request} ran without confirmation");
        assert!(response.result.is_none());
        assert_eq!(response.command.as_deref(), Some(target));
        assert!(response.message.contains("requires confirmation"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["suggestions"][0]["command"], format!("make {target}"));
        assert_eq!(json["suggestions"][0]["requiresConfirmation"], true);
    }
    assert!(spy.calls().is_empty());
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test]
async fn test_mutating_targets_in_one_category_serialize() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::with_delay(Duration::from_millis(100)));
    let bridge = bridge_with(&dir, spy.clone());

    let args = no_args();
    let (a, b) = tokio::join!(
        bridge.execute_make_command("db-migrate", &args, false),
        bridge.execute_make_command("db-migrate", &args, false),
    );

    assert!(a.success && b.success);
    assert_eq!(spy.calls().len(), 2);
    assert_eq!(spy.max_active(), 1);
}

#[tokio::test]
async fn test_safe_targets_run_concurrently() {
    let dir = project(None);
    let spy = Arc::new(SpyRunner::with_delay(Duration::from_millis(100)));
    let bridge = bridge_with(&dir, spy.clone());

    let args = no_args();
    let (a, b) = tokio::join!(
        bridge.execute_make_command("dev-status", &args, false),
        bridge.execute_make_command("test", &args, false),
    );

    assert!(a.success && b.success);
    assert_eq!(spy.max_active(), 2);
}
