// src/make/bridge.rs
// MakeCommandBridge: owns the safety rules, target cache, engines and locks

use super::locks::CategoryLocks;
use super::runner::{CommandRunner, DEFAULT_EXEC_TIMEOUT, MakeInvocation, ProcessRunner};
use super::safety::{normalize_args, validate_safety, validate_target_name};
use super::targets::{MakeTarget, assess_target_safety, categorize_target, discover_targets};
use super::{MakeCommandResult, TargetHelp, combine_output};
use crate::cache::{DEFAULT_TTL, TtlCache};
use crate::config::{EnvConfig, SafetyRules};
use crate::config::env::DEFAULT_HEALTH_URL;
use crate::error::BridgeError;
use crate::http::create_probe_client;
use crate::intent::IntentMapper;
use crate::suggest::{AutoSuggestionEngine, CommandSuggestionEngine, SafetyLevel, SuggestionContext};
use crate::utils::{MAX_OUTPUT_SIZE, truncate_output};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Extra time granted on top of the runner's own timeout before giving up on it.
/// Must exceed [`DRAIN_GRACE`](super::runner::DRAIN_GRACE) so a killed run can still hand back its output.
pub const OUTER_TIMEOUT_SLACK: Duration = Duration::from_secs(2);

pub struct MakeCommandBridge {
    pub(super) project_root: PathBuf,
    pub(super) safety_rules: SafetyRules,
    pub(super) runner: Arc<dyn CommandRunner>,
    pub(super) http: reqwest::Client,
    pub(super) health_url: String,
    pub(super) suggestion_engine: Arc<CommandSuggestionEngine>,
    pub(super) auto_engine: AutoSuggestionEngine,
    target_cache: TtlCache<Vec<MakeTarget>>,
    parse_count: AtomicUsize,
    exec_timeout: Duration,
    locks: CategoryLocks,
}

impl MakeCommandBridge {
    /// Bridge rooted at `project_root`, with rules from its .clauderc
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let safety_rules = SafetyRules::load(&project_root);
        let suggestion_engine = Arc::new(CommandSuggestionEngine::new());

        Self {
            auto_engine: AutoSuggestionEngine::new(IntentMapper::new(), suggestion_engine.clone()),
            suggestion_engine,
            project_root,
            safety_rules,
            runner: Arc::new(ProcessRunner::default()),
            http: create_probe_client(),
            health_url: DEFAULT_HEALTH_URL.to_string(),
            target_cache: TtlCache::new(DEFAULT_TTL),
            parse_count: AtomicUsize::new(0),
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            locks: CategoryLocks::new(),
        }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.project_root.clone()).with_health_url(config.health_url.clone())
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.target_cache = TtlCache::new(ttl);
        self
    }

    pub fn with_exec_timeout(mut self, timeout: Duration) -> Self {
        self.exec_timeout = timeout;
        self
    }

    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = url.into();
        self
    }

    pub fn with_safety_rules(mut self, rules: SafetyRules) -> Self {
        self.safety_rules = rules;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn safety_rules(&self) -> &SafetyRules {
        &self.safety_rules
    }

    pub fn auto_engine(&self) -> &AutoSuggestionEngine {
        &self.auto_engine
    }

    pub fn suggestion_engine(&self) -> &CommandSuggestionEngine {
        &self.suggestion_engine
    }

    /// Number of times Makefiles were actually parsed (cache misses)
    pub fn parse_count(&self) -> usize {
        self.parse_count.load(Ordering::Relaxed)
    }

    /// Validate, then run `make <target> KEY=value ...`. Never fails; problems
    /// are reported in the returned result.
    pub async fn execute_make_command(
        &self,
        target: &str,
        args: &BTreeMap<String, Value>,
        confirm: bool,
    ) -> MakeCommandResult {
        let started = Instant::now();
        let rejected = |reason: String| MakeCommandResult {
            success: false,
            output: String::new(),
            error: Some(reason),
            duration: elapsed_ms(started),
            command: format!("make {target}"),
        };

        if let Err(e) = validate_target_name(target) {
            return rejected(e.to_user_string());
        }
        if let Err(reason) = validate_safety(&self.safety_rules, target, confirm) {
            warn!(make_target = %target, reason = %reason, "Make command rejected by safety rules");
            return rejected(reason);
        }
        let args = match normalize_args(args) {
            Ok(args) => args,
            Err(e) => return rejected(e.to_user_string()),
        };

        let invocation = MakeInvocation::new(target, &self.project_root).with_args(args);
        let command = invocation.display();

        // One deadline covers waiting for the category lock and the run itself
        let deadline = tokio::time::Instant::now() + self.exec_timeout;

        // Mutating targets in the same category run one at a time
        let _guard = match assess_target_safety(target) {
            SafetyLevel::Safe => None,
            _ => {
                let category = categorize_target(target);
                match tokio::time::timeout_at(deadline, self.locks.acquire(category)).await {
                    Ok(guard) => Some(guard),
                    Err(_) => {
                        warn!(command = %command, category, "Timed out waiting for the category lock");
                        return MakeCommandResult {
                            success: false,
                            output: String::new(),
                            error: Some(format!(
                                "{} waiting for another {category} command to finish",
                                self.timeout_error(&command)
                            )),
                            duration: elapsed_ms(started),
                            command,
                        };
                    }
                }
            }
        };

        info!(command = %command, "Executing make command");
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let outcome = tokio::time::timeout_at(
            deadline + OUTER_TIMEOUT_SLACK,
            self.runner.run(&invocation, remaining),
        )
        .await;

        let result = match outcome {
            Ok(Ok(run)) => {
                let (stdout, stderr) = truncate_output(&run.stdout, &run.stderr, MAX_OUTPUT_SIZE);
                let error = run.failure_message(&command, self.exec_timeout);
                MakeCommandResult {
                    success: error.is_none(),
                    output: combine_output(&stdout, &stderr),
                    error,
                    duration: elapsed_ms(started),
                    command,
                }
            }
            Ok(Err(e)) => MakeCommandResult {
                success: false,
                output: String::new(),
                error: Some(e.to_user_string()),
                duration: elapsed_ms(started),
                command,
            },
            Err(_) => MakeCommandResult {
                success: false,
                output: String::new(),
                error: Some(self.timeout_error(&command)),
                duration: elapsed_ms(started),
                command,
            },
        };

        if result.success {
            info!(command = %result.command, duration_ms = result.duration, "Make command completed");
        } else {
            error!(
                command = %result.command,
                error = result.error.as_deref().unwrap_or(""),
                "Make command failed"
            );
        }

        self.suggestion_engine.learn_from_execution(
            target,
            &SuggestionContext::from_intent(target),
            result.success,
        );
        result
    }

    /// Annotated Makefile targets, optionally filtered by category (`all` = none).
    /// Cached per filter for the bridge's TTL.
    pub async fn list_make_targets(&self, category: Option<&str>) -> Vec<MakeTarget> {
        let filter = category.filter(|c| !c.is_empty() && *c != "all");
        let cache_key = format!("targets_{}", filter.unwrap_or("all"));

        if let Some(cached) = self.target_cache.get(&cache_key) {
            return cached;
        }

        self.parse_count.fetch_add(1, Ordering::Relaxed);
        let root = self.project_root.clone();
        let discovered = tokio::task::spawn_blocking(move || discover_targets(&root)).await;

        let targets = match discovered {
            Ok(Ok(targets)) => targets,
            Ok(Err(e)) => {
                error!(error = %e, "Failed to list make targets");
                return Vec::new();
            }
            Err(e) => {
                error!(error = %e, "Makefile discovery task failed");
                return Vec::new();
            }
        };

        let filtered: Vec<MakeTarget> = match filter {
            Some(category) => targets.into_iter().filter(|t| t.category == category).collect(),
            None => targets,
        };

        self.target_cache.insert(cache_key, filtered.clone());
        filtered
    }

    /// Help for one target; a stub with `safety: "unknown"` if it isn't annotated
    pub async fn get_make_command_help(&self, target: &str) -> TargetHelp {
        let targets = self.list_make_targets(None).await;
        let mapped_prerequisites = self.mapped_prerequisites(target);

        match targets.into_iter().find(|t| t.name == target) {
            Some(info) => TargetHelp {
                usage: format!("make {}", info.name),
                target: info.name,
                description: info.description,
                safety: info.safety.to_string(),
                prerequisites: if info.prerequisites.is_empty() {
                    mapped_prerequisites
                } else {
                    info.prerequisites
                },
            },
            None => TargetHelp {
                target: target.to_string(),
                description: "Target not found or no description available".to_string(),
                usage: format!("make {target}"),
                safety: "unknown".to_string(),
                prerequisites: Vec::new(),
            },
        }
    }

    fn timeout_error(&self, command: &str) -> String {
        BridgeError::Timeout {
            command: command.to_string(),
            timeout: self.exec_timeout,
        }
        .to_string()
    }

    /// Advisory prerequisites recorded for this target in the intent table
    fn mapped_prerequisites(&self, target: &str) -> Vec<String> {
        self.auto_engine
            .mapper()
            .all_mappings()
            .iter()
            .find(|m| m.make_target == target && !m.prerequisites.is_empty())
            .map(|m| m.prerequisites.iter().map(|p| p.to_string()).collect())
            .unwrap_or_default()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
