// src/mcp/mod.rs
// MCP Server implementation

mod requests;

pub use requests::{
    CheckFirstRequest, ExecuteMakeRequest, IntentRequest, ListTargetsRequest, StatusRequest,
    TargetRequest,
};

use crate::ai_service::AiServiceBridge;
use crate::make::{MakeCommandBridge, TargetCategory};
use rmcp::{
    ErrorData, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pretty JSON text for a tool result
fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

/// MCP Server state
#[derive(Clone)]
pub struct DevBridgeServer {
    pub bridge: Arc<MakeCommandBridge>,
    pub ai_service: Option<Arc<AiServiceBridge>>,
    tool_router: ToolRouter<Self>,
}

impl DevBridgeServer {
    pub fn new(bridge: Arc<MakeCommandBridge>, ai_service: Option<Arc<AiServiceBridge>>) -> Self {
        Self {
            bridge,
            ai_service,
            tool_router: Self::tool_router(),
        }
    }

    /// Tools served by this process, in registration order
    pub fn local_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Forward a tool this server does not own to the AI Service
    async fn call_remote_tool(&self, request: CallToolRequestParam) -> CallToolResult {
        let Some(ai) = &self.ai_service else {
            warn!(tool = %request.name, "Unknown tool requested");
            return CallToolResult::error(vec![Content::text(format!(
                "Error: Unknown tool: {}",
                request.name
            ))]);
        };

        let args = request.arguments.unwrap_or_default();
        match ai.execute_tool(&request.name, &args).await {
            Ok(value) => match to_json(&value) {
                Ok(text) => CallToolResult::success(vec![Content::text(text)]),
                Err(e) => CallToolResult::error(vec![Content::text(format!("Error: {e}"))]),
            },
            Err(e) => {
                warn!(tool = %request.name, error = %e, "AI Service tool failed");
                CallToolResult::error(vec![Content::text(format!("Error: {}", e.to_user_string()))])
            }
        }
    }
}

#[tool_router]
impl DevBridgeServer {
    #[tool(description = "ALWAYS USE FIRST: check whether a Make command covers the user's request and run it when confidence is high. Use before writing custom commands.")]
    async fn check_make_commands_first(
        &self,
        Parameters(req): Parameters<CheckFirstRequest>,
    ) -> Result<String, String> {
        let response = self
            .bridge
            .check_make_commands_first(&req.user_request, req.auto_execute)
            .await;
        to_json(&response)
    }

    #[tool(description = "Execute a Make command. Dangerous targets require confirm: true.")]
    async fn execute_make_command(
        &self,
        Parameters(req): Parameters<ExecuteMakeRequest>,
    ) -> Result<String, String> {
        let args = req.args.unwrap_or_default();
        let result = self
            .bridge
            .execute_make_command(&req.target, &args, req.confirm)
            .await;
        to_json(&result)
    }

    #[tool(description = "List available Make targets with descriptions, categories and safety levels.")]
    async fn list_make_targets(
        &self,
        Parameters(req): Parameters<ListTargetsRequest>,
    ) -> Result<String, String> {
        let category = req.category.map(|c: TargetCategory| c.as_str());
        let targets = self.bridge.list_make_targets(category).await;
        to_json(&targets)
    }

    #[tool(description = "Get detailed help for a specific Make target.")]
    async fn make_command_help(
        &self,
        Parameters(req): Parameters<TargetRequest>,
    ) -> Result<String, String> {
        let help = self.bridge.get_make_command_help(&req.target).await;
        to_json(&help)
    }

    #[tool(description = "Check whether prerequisites for a Make target are met.")]
    async fn validate_make_prerequisites(
        &self,
        Parameters(req): Parameters<TargetRequest>,
    ) -> Result<String, String> {
        let report = self.bridge.validate_make_prerequisites(&req.target).await;
        to_json(&report)
    }

    #[tool(description = "Get status of services managed by Make commands.")]
    async fn make_command_status(
        &self,
        Parameters(req): Parameters<StatusRequest>,
    ) -> Result<String, String> {
        let statuses = self.bridge.get_make_command_status(req.service).await;
        to_json(&statuses)
    }

    #[tool(description = "Analyze a natural-language intent and recommend Make commands.")]
    async fn analyze_user_intent(
        &self,
        Parameters(req): Parameters<IntentRequest>,
    ) -> Result<String, String> {
        let response = self
            .bridge
            .analyze_user_intent(req.intent.as_deref(), req.current_state)
            .await;
        to_json(&response)
    }

    #[tool(description = "Get context-aware Make command suggestions.")]
    async fn get_command_suggestions(
        &self,
        Parameters(req): Parameters<IntentRequest>,
    ) -> Result<String, String> {
        let response = self
            .bridge
            .get_command_suggestions(req.intent.as_deref(), req.current_state)
            .await;
        to_json(&response)
    }
}

impl ServerHandler for DevBridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "devbridge".into(),
                title: Some("DevBridge - Make command bridge for coding agents".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Call check_make_commands_first before running custom shell commands. Project tasks are exposed as Make targets with safety levels.".into(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let mut tools = self.local_tools();
            if let Some(ai) = &self.ai_service {
                let remote = ai.list_tools().await;
                debug!(count = remote.len(), "Listing AI Service tools");
                tools.extend(
                    remote
                        .into_iter()
                        .filter(|t| !self.tool_router.has_route(&t.name))
                        .map(|t| {
                            let schema = Arc::new(t.input_schema());
                            Tool::new(t.name, t.description, schema)
                        }),
                );
            }
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            debug!(tool = %request.name, "Tool call");
            if !self.tool_router.has_route(&request.name) {
                return Ok(self.call_remote_tool(request).await);
            }
            let ctx = ToolCallContext::new(self, request, context);
            self.tool_router.call(ctx).await
        }
    }
}
