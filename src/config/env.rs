// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Default health endpoint pinged before dev-/db- targets
pub const DEFAULT_HEALTH_URL: &str = "http://localhost:3001/api/health";

/// Default AI Service request timeout
pub const DEFAULT_AI_SERVICE_TIMEOUT_MS: u64 = 30_000;

/// Remote AI Service connection settings (AI_SERVICE_*)
#[derive(Debug, Clone)]
pub struct AiServiceSettings {
    /// Base URL (AI_SERVICE_URL)
    pub url: String,
    /// Bearer token (AI_SERVICE_AUTH_TOKEN)
    pub auth_token: Option<String>,
    /// Request timeout (AI_SERVICE_TIMEOUT_MS)
    pub timeout: Duration,
}

/// All environment-derived settings
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Directory where make runs (DEVBRIDGE_PROJECT_ROOT, default: cwd)
    pub project_root: PathBuf,
    /// Health endpoint for prerequisite checks (DEVBRIDGE_HEALTH_URL)
    pub health_url: String,
    /// Optional AI Service passthrough; None disables it
    pub ai_service: Option<AiServiceSettings>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let project_root = read_var("DEVBRIDGE_PROJECT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let health_url =
            read_var("DEVBRIDGE_HEALTH_URL").unwrap_or_else(|| DEFAULT_HEALTH_URL.to_string());

        let ai_service = read_var("AI_SERVICE_URL").map(|url| AiServiceSettings {
            url,
            auth_token: read_var("AI_SERVICE_AUTH_TOKEN"),
            timeout: Duration::from_millis(
                read_var("AI_SERVICE_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_AI_SERVICE_TIMEOUT_MS),
            ),
        });

        let config = Self {
            project_root,
            health_url,
            ai_service,
        };
        config.log_status();
        config
    }

    /// Override the project root (CLI flag wins over env)
    pub fn with_project_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.project_root = root;
        }
        self
    }

    fn log_status(&self) {
        debug!(project_root = %self.project_root.display(), "Project root resolved");
        match &self.ai_service {
            Some(ai) => info!(url = %ai.url, "AI Service passthrough enabled"),
            None => debug!("AI Service passthrough disabled (no AI_SERVICE_URL)"),
        }
    }
}

/// Read an env var, filtering empty values
fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_project_root_override() {
        let config = EnvConfig {
            project_root: PathBuf::from("/from/env"),
            health_url: DEFAULT_HEALTH_URL.to_string(),
            ai_service: None,
        };
        let config = config.with_project_root(Some(PathBuf::from("/from/cli")));
        assert_eq!(config.project_root, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_with_project_root_none_keeps_env() {
        let config = EnvConfig {
            project_root: PathBuf::from("/from/env"),
            health_url: DEFAULT_HEALTH_URL.to_string(),
            ai_service: None,
        };
        let config = config.with_project_root(None);
        assert_eq!(config.project_root, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_read_var_filters_missing() {
        assert_eq!(read_var("DEVBRIDGE_TEST_DEFINITELY_UNSET_VAR"), None);
    }
}
