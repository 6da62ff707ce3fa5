// src/mcp/requests.rs
// MCP tool request types

use crate::make::{ServiceKind, TargetCategory};
use crate::suggest::ProjectState;
use rmcp::schemars;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckFirstRequest {
    #[schemars(description = "The user's request in natural language")]
    pub user_request: String,
    #[schemars(description = "Run the matched command when confidence is high (default: true)")]
    #[serde(default = "default_true")]
    pub auto_execute: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExecuteMakeRequest {
    #[schemars(description = "Make target to execute (e.g., dev-up, test, db-migrate)")]
    pub target: String,
    #[schemars(description = "Make variables passed as KEY=value")]
    pub args: Option<BTreeMap<String, Value>>,
    #[schemars(description = "Confirm execution of dangerous commands")]
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListTargetsRequest {
    #[schemars(description = "Filter targets by category (default: all)")]
    pub category: Option<TargetCategory>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TargetRequest {
    #[schemars(description = "Make target name")]
    pub target: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StatusRequest {
    #[schemars(description = "Service to check: dev, database, mcp, trading or all (default: all)")]
    pub service: Option<ServiceKind>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    #[schemars(description = "What the user wants to accomplish")]
    pub intent: Option<String>,
    #[schemars(description = "Known project state used to tailor suggestions")]
    pub current_state: Option<ProjectState>,
}
