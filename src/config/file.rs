// src/config/file.rs
// Safety rules from the project's .clauderc (JSON)

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in the project root
pub const CLAUDERC_FILE: &str = ".clauderc";

/// Top-level .clauderc structure. Unknown keys are ignored.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeRc {
    #[serde(default)]
    pub safety_rules: SafetyRules,
}

/// Process-wide execution policy, loaded once per bridge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRules {
    /// Substrings that block a target outright ("make " prefix ignored)
    #[serde(default)]
    pub block_commands: Vec<String>,
    /// Substrings that make a target require `confirm: true`
    #[serde(default)]
    pub require_confirmation: Vec<String>,
    /// Exact target names that may never run ("make " prefix ignored)
    #[serde(default)]
    pub forbidden: Vec<String>,
}

impl SafetyRules {
    /// Load rules from `<project_root>/.clauderc`.
    ///
    /// A missing or malformed file yields empty rules and a warning.
    pub fn load(project_root: &Path) -> Self {
        let path = Self::config_path(project_root);

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(rules) => {
                    debug!(path = %path.display(), "Safety rules loaded from .clauderc");
                    rules
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not parse .clauderc, using empty safety rules");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load safety rules from .clauderc");
                Self::default()
            }
        }
    }

    /// Parse the JSON body of a .clauderc file
    pub fn parse(contents: &str) -> Result<Self> {
        let rc: ClaudeRc = serde_json::from_str(contents)?;
        Ok(rc.safety_rules)
    }

    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(CLAUDERC_FILE)
    }

    pub fn is_empty(&self) -> bool {
        self.block_commands.is_empty()
            && self.require_confirmation.is_empty()
            && self.forbidden.is_empty()
    }
}
