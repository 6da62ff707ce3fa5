// src/make/probe.rs
// Best-effort prerequisite checks and per-service status

use super::runner::MakeInvocation;
use super::{MakeCommandBridge, PrerequisiteReport};
use crate::error::BridgeError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub const HEALTH_PING_TIMEOUT: Duration = Duration::from_secs(5);
pub const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// File expected to hold trading API keys
const TRADING_ENV_FILE: &str = ".env.local";
const TRADING_KEY_NAMES: &[&str] = &["BINANCE_API_KEY", "ALPACA_API_KEY"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Dev,
    Database,
    Mcp,
    Trading,
    All,
}

impl std::str::FromStr for ServiceKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_lowercase())).map_err(|_| {
            BridgeError::InvalidInput(format!(
                "unknown service '{s}' (expected dev, database, mcp, trading or all)"
            ))
        })
    }
}

/// One probed service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
    /// `{"output": ...}` on success, `{"error": ...}` otherwise
    pub details: Value,
}

/// A read-only make target standing in for a service
struct StatusProbe {
    kind: ServiceKind,
    service: &'static str,
    target: &'static str,
    timeout: Duration,
    up: &'static str,
    down: &'static str,
}

const STATUS_PROBES: &[StatusProbe] = &[
    StatusProbe {
        kind: ServiceKind::Dev,
        service: "development",
        target: "dev-status",
        timeout: Duration::from_secs(15),
        up: "running",
        down: "error",
    },
    StatusProbe {
        kind: ServiceKind::Database,
        service: "database",
        target: "check-db",
        timeout: DATABASE_CHECK_TIMEOUT,
        up: "healthy",
        down: "error",
    },
    StatusProbe {
        kind: ServiceKind::Mcp,
        service: "mcp",
        target: "mcp-status",
        timeout: Duration::from_secs(10),
        up: "running",
        down: "stopped",
    },
    StatusProbe {
        kind: ServiceKind::Trading,
        service: "trading",
        target: "trading-status",
        timeout: Duration::from_secs(10),
        up: "running",
        down: "stopped",
    },
];

impl MakeCommandBridge {
    /// Advisory checks for `target`. Never fails; problems land in `missing`/`warnings`.
    pub async fn validate_make_prerequisites(&self, target: &str) -> PrerequisiteReport {
        let mut missing = Vec::new();
        let mut warnings = Vec::new();

        if (target.contains("dev-") || target.contains("db-"))
            && !self.ping_health().await
            && target != "dev-up"
        {
            missing.push("AI Service not running (try: make dev-up)".to_string());
        }

        if target.contains("db-") && self.run_probe("check-db", DATABASE_CHECK_TIMEOUT).await.is_err() {
            warnings.push("Database connectivity check failed".to_string());
        }

        if target.contains("trading-") {
            let env_file = self.project_root.join(TRADING_ENV_FILE);
            match tokio::fs::read_to_string(&env_file).await {
                Ok(content) => {
                    if !TRADING_KEY_NAMES.iter().any(|k| content.contains(k)) {
                        warnings.push(format!("Trading API keys not configured in {TRADING_ENV_FILE}"));
                    }
                }
                Err(_) => missing.push(format!("{TRADING_ENV_FILE} file not found")),
            }
        }

        debug!(make_target = %target, missing = missing.len(), warnings = warnings.len(), "Prerequisites checked");
        PrerequisiteReport {
            valid: missing.is_empty(),
            missing,
            warnings,
        }
    }

    /// Run the read-only status targets for `service` (default: all).
    /// Each probe fails independently.
    pub async fn get_make_command_status(&self, service: Option<ServiceKind>) -> Vec<ServiceStatus> {
        let wanted = service.unwrap_or(ServiceKind::All);
        let mut statuses = Vec::new();

        for probe in STATUS_PROBES {
            if wanted != ServiceKind::All && wanted != probe.kind {
                continue;
            }
            let status = match self.run_probe(probe.target, probe.timeout).await {
                Ok(output) => ServiceStatus {
                    service: probe.service.to_string(),
                    status: probe.up.to_string(),
                    details: json!({ "output": output.trim() }),
                },
                Err(error) => ServiceStatus {
                    service: probe.service.to_string(),
                    status: probe.down.to_string(),
                    details: json!({ "error": error }),
                },
            };
            statuses.push(status);
        }
        statuses
    }

    /// Any HTTP response counts as reachable
    async fn ping_health(&self) -> bool {
        self.http
            .get(&self.health_url)
            .timeout(HEALTH_PING_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    /// Run a read-only make target, returning stdout or the failure text
    async fn run_probe(&self, target: &str, timeout: Duration) -> Result<String, String> {
        let invocation = MakeInvocation::new(target, &self.project_root);
        let command = invocation.display();
        match self.runner.run(&invocation, timeout).await {
            Ok(out) => match out.failure_message(&command, timeout) {
                None => Ok(out.stdout),
                Some(error) => Err(error),
            },
            Err(e) => Err(e.to_user_string()),
        }
    }
}
