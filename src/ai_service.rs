// src/ai_service.rs
// Optional passthrough to the remote AI Service tool API

use crate::cache::{DEFAULT_TTL, TtlCache};
use crate::config::AiServiceSettings;
use crate::error::{BridgeError, Result};
use crate::http::create_service_client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

/// Tool definition as served by the AI Service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema `properties` for the tool's arguments
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub requires_auth: bool,
}

impl RemoteTool {
    /// Full JSON Schema object for the arguments
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(self.parameters.clone()));
        schema
    }
}

#[derive(Deserialize)]
struct ToolList {
    #[serde(default)]
    tools: Vec<RemoteTool>,
}

#[derive(Deserialize)]
struct ToolResult {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// How tool arguments are shaped for a direct endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Send nothing
    Empty,
    /// GET query string from the arguments
    Query,
    /// POST the arguments as the JSON body
    Body,
    /// `{query, limit}` with limit defaulting to 10
    Search,
}

struct DirectEndpoint {
    tool: &'static str,
    method: Method,
    path: &'static str,
    shape: Shape,
}

/// Used when the tool execution endpoint is unavailable
const DIRECT_ENDPOINTS: &[DirectEndpoint] = &[
    DirectEndpoint { tool: "get_financial_summary", method: Method::Get, path: "/api/dashboard/financial-summary", shape: Shape::Query },
    DirectEndpoint { tool: "get_account_balance", method: Method::Get, path: "/api/financial/balance", shape: Shape::Empty },
    DirectEndpoint { tool: "get_transactions", method: Method::Get, path: "/api/financial/transactions", shape: Shape::Query },
    DirectEndpoint { tool: "analyze_expenses", method: Method::Post, path: "/api/financial/analyze-expenses", shape: Shape::Body },
    DirectEndpoint { tool: "create_invoice", method: Method::Post, path: "/api/financial/invoices", shape: Shape::Body },
    DirectEndpoint { tool: "search_documents", method: Method::Post, path: "/api/documents/search", shape: Shape::Search },
    DirectEndpoint { tool: "analyze_document", method: Method::Post, path: "/api/documents/analyze", shape: Shape::Body },
    DirectEndpoint { tool: "get_system_health", method: Method::Get, path: "/api/health", shape: Shape::Empty },
];


/// Tool list served when `/api/mcp/tools` cannot be reached
pub fn fallback_tools() -> Vec<RemoteTool> {
    fn tool(
        name: &str,
        description: &str,
        category: &str,
        requires_auth: bool,
        params: &[(&str, &str, &str)],
    ) -> RemoteTool {
        RemoteTool {
            name: name.to_string(),
            description: description.to_string(),
            parameters: params
                .iter()
                .map(|(key, kind, desc)| {
                    (key.to_string(), json!({ "type": kind, "description": desc }))
                })
                .collect(),
            category: Some(category.to_string()),
            requires_auth,
        }
    }

    vec![
        tool(
            "get_financial_summary",
            "Get a summary of financial data for a specified period",
            "financial",
            true,
            &[("period", "string", "Period (e.g., \"last_month\", \"this_year\")")],
        ),
        tool("get_account_balance", "Get current account balance", "financial", true, &[]),
        tool(
            "get_transactions",
            "Get transactions with optional filters",
            "financial",
            true,
            &[
                ("limit", "number", "Number of transactions to return"),
                ("category", "string", "Filter by category"),
                ("startDate", "string", "Start date (ISO format)"),
                ("endDate", "string", "End date (ISO format)"),
            ],
        ),
        tool(
            "analyze_expenses",
            "Analyze expenses by category and period",
            "financial",
            true,
            &[
                ("period", "string", "Analysis period"),
                ("groupBy", "string", "Group by (category, merchant, etc.)"),
            ],
        ),
        tool(
            "create_invoice",
            "Create a new invoice",
            "financial",
            true,
            &[
                ("clientId", "number", "Client ID"),
                ("items", "array", "Invoice line items"),
                ("dueDate", "string", "Due date (ISO format)"),
            ],
        ),
        tool(
            "search_documents",
            "Search documents using semantic search",
            "documents",
            true,
            &[
                ("query", "string", "Search query"),
                ("limit", "number", "Maximum results to return"),
            ],
        ),
        tool(
            "analyze_document",
            "Analyze a document using AI",
            "documents",
            true,
            &[
                ("documentId", "string", "Document ID"),
                ("analysisType", "string", "Type of analysis"),
            ],
        ),
        tool("get_system_health", "Get system health status", "system", false, &[]),
    ]
}

/// Cache key: tool name plus the serialized arguments
pub fn cache_key(tool: &str, args: &Map<String, Value>) -> String {
    format!("{tool}:{}", Value::Object(args.clone()))
}

/// Client for the AI Service with a 5-minute response cache
pub struct AiServiceBridge {
    client: reqwest::Client,
    base_url: String,
    cache: TtlCache<Value>,
}

impl AiServiceBridge {
    pub fn new(settings: &AiServiceSettings) -> Self {
        Self {
            client: create_service_client(settings.timeout, settings.auth_token.as_deref()),
            base_url: settings.url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(DEFAULT_TTL),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Remote tool definitions, or the built-in list when the service is unreachable
    pub async fn list_tools(&self) -> Vec<RemoteTool> {
        match self.fetch_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                warn!(error = %e, "Failed to fetch tools from MCP endpoint, using fallback");
                fallback_tools()
            }
        }
    }

    async fn fetch_tools(&self) -> Result<Vec<RemoteTool>> {
        let list: ToolList = self
            .client
            .get(self.url("/api/mcp/tools"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(list.tools)
    }

    /// Execute a tool remotely. Results are cached; on failure the tool's
    /// direct endpoint is tried, and unknown tools yield [`BridgeError::UnknownTool`].
    pub async fn execute_tool(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        let key = cache_key(name, args);
        if let Some(cached) = self.cache.get(&key) {
            debug!(tool = %name, "Returning cached AI Service result");
            return Ok(cached);
        }

        match self.execute_remote(name, args).await {
            Ok(result) => {
                self.cache.insert(key, result.clone());
                Ok(result)
            }
            Err(e) => {
                debug!(tool = %name, error = %e, "Tool execution endpoint failed");
                self.execute_direct(name, args).await
            }
        }
    }

    async fn execute_remote(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        let response: ToolResult = self
            .client
            .post(self.url(&format!("/api/mcp/tools/{name}/execute")))
            .json(&json!({ "arguments": args }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.result)
    }

    async fn execute_direct(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        let endpoint = DIRECT_ENDPOINTS
            .iter()
            .find(|e| e.tool == name)
            .ok_or_else(|| BridgeError::UnknownTool(name.to_string()))?;
        info!(tool = %name, path = endpoint.path, "Using fallback execution");

        let url = self.url(endpoint.path);
        let request = match (endpoint.method, endpoint.shape) {
            (Method::Get, Shape::Query) => self.client.get(url).query(&query_pairs(args)),
            (Method::Get, _) => self.client.get(url),
            (Method::Post, Shape::Search) => self.client.post(url).json(&search_body(args)),
            (Method::Post, _) => self.client.post(url).json(args),
        };

        let value = request.send().await?.error_for_status()?.json().await?;
        Ok(value)
    }
}

/// Scalars as query parameters; strings unquoted, nulls dropped
fn query_pairs(args: &Map<String, Value>) -> Vec<(String, String)> {
    args.iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k.clone(), s.clone())),
            other => Some((k.clone(), other.to_string())),
        })
        .collect()
}

fn search_body(args: &Map<String, Value>) -> Value {
    json!({
        "query": args.get("query").cloned().unwrap_or(Value::Null),
        "limit": args.get("limit").filter(|v| !v.is_null()).cloned().unwrap_or(json!(10)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_bridge() -> AiServiceBridge {
        // Port 9 (discard) is closed on test machines; connections are refused
        AiServiceBridge::new(&AiServiceSettings {
            url: "http://127.0.0.1:9/".to_string(),
            auth_token: Some("t".to_string()),
            timeout: Duration::from_secs(2),
        })
    }

    #[test]
    fn test_fallback_tools_cover_direct_endpoints() {
        let tools = fallback_tools();
        assert_eq!(tools.len(), DIRECT_ENDPOINTS.len());
        for endpoint in DIRECT_ENDPOINTS {
            assert!(tools.iter().any(|t| t.name == endpoint.tool), "{}", endpoint.tool);
        }
        let transactions = tools.iter().find(|t| t.name == "get_transactions").unwrap();
        assert_eq!(transactions.parameters["limit"]["type"], "number");
        assert!(!tools.iter().find(|t| t.name == "get_system_health").unwrap().requires_auth);
    }

    #[test]
    fn test_input_schema_wraps_properties() {
        let tool = &fallback_tools()[0];
        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].get("period").is_some());
    }

    #[test]
    fn test_cache_key_includes_args() {
        let mut args = Map::new();
        args.insert("period".into(), json!("last_month"));
        assert_eq!(cache_key("get_financial_summary", &args), r#"get_financial_summary:{"period":"last_month"}"#);
        assert_eq!(cache_key("x", &Map::new()), "x:{}");
    }

    #[test]
    fn test_query_pairs_and_search_body() {
        let mut args = Map::new();
        args.insert("limit".into(), json!(5));
        args.insert("category".into(), json!("travel"));
        args.insert("skip".into(), Value::Null);
        let pairs = query_pairs(&args);
        assert!(pairs.contains(&("limit".to_string(), "5".to_string())));
        assert!(pairs.contains(&("category".to_string(), "travel".to_string())));
        assert_eq!(pairs.len(), 2);

        let mut search = Map::new();
        search.insert("query".into(), json!("invoices"));
        assert_eq!(search_body(&search), json!({"query": "invoices", "limit": 10}));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        assert_eq!(unreachable_bridge().base_url, "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn test_list_tools_falls_back_when_unreachable() {
        let tools = unreachable_bridge().list_tools().await;
        assert_eq!(tools, fallback_tools());
    }

    #[tokio::test]
    async fn test_unknown_tool_when_unreachable() {
        let err = unreachable_bridge()
            .execute_tool("no_such_tool", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownTool(ref n) if n == "no_such_tool"));
    }

    #[tokio::test]
    async fn test_known_tool_fallback_surfaces_http_error() {
        let err = unreachable_bridge()
            .execute_tool("get_system_health", &Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Http(_)));
    }

    #[tokio::test]
    async fn test_cached_result_short_circuits() {
        let bridge = unreachable_bridge();
        let args = Map::new();
        bridge
            .cache
            .insert(cache_key("get_account_balance", &args), json!({"balance": 42}));
        let value = bridge.execute_tool("get_account_balance", &args).await.unwrap();
        assert_eq!(value["balance"], 42);
    }
}
