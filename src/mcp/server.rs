//! MCP server setup and lifecycle.
//!
//! Implements a JSON-RPC based MCP server over stdio. Stdout carries the
//! protocol, so all logging goes to stderr.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info_span, Instrument};

use crate::api::ApiClient;
use crate::enrichment::ContactResolver;
use crate::mcp::{PromptRegistry, ResourceHandler, ToolRegistry};
use crate::{Error, Result};

/// Default maximum requests per rate limit window.
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: usize = 1000;

/// Default rate limit window duration (1 minute).
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Maximum request body size (1MB) to prevent `DoS` via large payloads.
const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// MCP protocol version.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name.
const SERVER_NAME: &str = "bluebubbles-mcp";

/// MCP rate limit configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: usize,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    /// Creates config from environment variables.
    ///
    /// Reads `BLUEBUBBLES_MCP_RATE_LIMIT_MAX_REQUESTS` and
    /// `BLUEBUBBLES_MCP_RATE_LIMIT_WINDOW_SECS` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let max_requests = std::env::var("BLUEBUBBLES_MCP_RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);

        let window_secs = std::env::var("BLUEBUBBLES_MCP_RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);

        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Sets maximum requests per window.
    #[must_use]
    pub const fn with_max_requests(mut self, max: usize) -> Self {
        self.max_requests = max;
        self
    }

    /// Sets window duration in seconds.
    #[must_use]
    pub const fn with_window_secs(mut self, secs: u64) -> Self {
        self.window = Duration::from_secs(secs);
        self
    }
}

/// Per-window request accounting for the stdio loop.
struct RateLimiter {
    config: RateLimitConfig,
    request_count: usize,
    window_start: Instant,
}

impl RateLimiter {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            request_count: 0,
            window_start: Instant::now(),
        }
    }

    /// Consumes one request from the current window's budget.
    ///
    /// Returns `false` when the budget is exhausted. The window resets
    /// once its duration has elapsed.
    fn try_acquire(&mut self) -> bool {
        if self.window_start.elapsed() > self.config.window {
            self.request_count = 0;
            self.window_start = Instant::now();
        }

        if self.request_count >= self.config.max_requests {
            return false;
        }

        self.request_count += 1;
        true
    }
}

/// MCP server for a BlueBubbles messaging server.
pub struct McpServer {
    /// Tool registry.
    tools: ToolRegistry,
    /// Resource handler.
    resources: ResourceHandler,
    /// Prompt registry.
    prompts: PromptRegistry,
    /// Rate limit configuration.
    rate_limit: RateLimitConfig,
}

impl McpServer {
    /// Creates a new MCP server backed by the given API client.
    ///
    /// All three surfaces share one contact resolver, so a cache refresh
    /// triggered by a tool also serves resources and prompts.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let resolver = std::sync::Arc::new(ContactResolver::new(client.clone()));

        Self {
            tools: ToolRegistry::new(client.clone(), resolver.clone()),
            resources: ResourceHandler::new(client.clone(), resolver.clone()),
            prompts: PromptRegistry::new(client, resolver),
            rate_limit: RateLimitConfig::from_env(),
        }
    }

    /// Sets the rate limit configuration.
    #[must_use]
    pub const fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Runs the server over stdio until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] when stdin or stdout breaks.
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();
        let mut limiter = RateLimiter::new(self.rate_limit.clone());

        loop {
            let line = lines.next_line().await.map_err(|e| Error::OperationFailed {
                operation: "read_stdin".to_string(),
                cause: e.to_string(),
            })?;
            let Some(line) = line else { break };

            if line.is_empty() {
                continue;
            }

            if !limiter.try_acquire() {
                write_line(&mut stdout, &self.rate_limited_response()).await?;
                continue;
            }

            let response = self.handle_request(&line).await;
            write_line(&mut stdout, &response).await?;
        }

        Ok(())
    }

    /// Builds the `-32000` rejection sent when the request budget is spent.
    fn rate_limited_response(&self) -> String {
        let max_requests = self.rate_limit.max_requests;
        let window = self.rate_limit.window;
        tracing::warn!("Rate limit exceeded: max {max_requests} requests in {window:?}");
        metrics::counter!("mcp_rate_limit_exceeded_total").increment(1);

        format_error(
            None,
            -32000,
            &format!("Rate limit exceeded: max {max_requests} requests per {window:?}"),
        )
    }

    /// Handles a JSON-RPC request.
    pub(crate) async fn handle_request(&self, request: &str) -> String {
        // Check request size before processing to prevent DoS
        if request.len() > MAX_REQUEST_BODY_SIZE {
            tracing::warn!(
                request_size = request.len(),
                max_size = MAX_REQUEST_BODY_SIZE,
                "Request exceeds maximum size limit"
            );
            return format_error(
                None,
                -32600,
                &format!(
                    "Request too large: {} bytes (max: {} bytes)",
                    request.len(),
                    MAX_REQUEST_BODY_SIZE
                ),
            );
        }

        let start = Instant::now();
        let parsed: std::result::Result<JsonRpcRequest, _> = serde_json::from_str(request);
        let mut method_label = "parse_error".to_string();
        let status_label;

        let response = match parsed {
            Ok(req) => {
                method_label.clone_from(&req.method);
                let span = info_span!(
                    "mcp.request",
                    rpc.method = method_label.as_str(),
                    rpc.id = ?req.id,
                );

                tracing::info!(method = %method_label, "Processing MCP request");

                let result = self
                    .dispatch_method(&req.method, req.params)
                    .instrument(span)
                    .await;
                status_label = if result.is_ok() { "success" } else { "error" };
                format_response(req.id, result)
            }
            Err(e) => {
                status_label = "parse_error";
                format_error(None, -32700, &format!("Parse error: {e}"))
            }
        };

        metrics::counter!(
            "mcp_requests_total",
            "method" => method_label.clone(),
            "status" => status_label
        )
        .increment(1);
        metrics::histogram!(
            "mcp_request_duration_ms",
            "method" => method_label
        )
        .record(start.elapsed().as_secs_f64() * 1000.0);

        response
    }

    /// Dispatches a method call.
    async fn dispatch_method(&self, method: &str, params: Option<Value>) -> DispatchResult {
        use super::dispatch::McpMethod;

        match McpMethod::from(method) {
            McpMethod::Initialize => self.handle_initialize(params),
            McpMethod::ListTools => self.handle_list_tools(),
            McpMethod::CallTool => self.handle_call_tool(params).await,
            McpMethod::ListResources => self.handle_list_resources(),
            McpMethod::ReadResource => self.handle_read_resource(params).await,
            McpMethod::ListPrompts => self.handle_list_prompts(),
            McpMethod::GetPrompt => self.handle_get_prompt(params).await,
            McpMethod::Ping => Ok(serde_json::json!({})),
            McpMethod::Unknown(name) => Err((-32601, format!("Method not found: {name}"))),
        }
    }

    /// Handles the initialize method.
    fn handle_initialize(&self, _params: Option<Value>) -> DispatchResult {
        Ok(serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    /// Handles tools/list.
    fn handle_list_tools(&self) -> DispatchResult {
        let tools: Vec<Value> = self
            .tools
            .list_tools()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        Ok(serde_json::json!({ "tools": tools }))
    }

    /// Handles tools/call.
    ///
    /// Tool failures become `isError` results rather than protocol
    /// errors, so agents see what went wrong.
    async fn handle_call_tool(&self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((-32602, "Missing params".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing tool name".to_string()))?;
        let tool_name = name.to_string();
        let span = info_span!("mcp.tool.call", tool.name = tool_name.as_str());
        let start = Instant::now();

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let (result, status_label) = match self.tools.execute(name, arguments).instrument(span).await
        {
            Ok(result) => {
                let status_label = if result.is_error { "error" } else { "success" };
                (
                    Ok(serde_json::json!({
                        "content": result.content,
                        "isError": result.is_error
                    })),
                    status_label,
                )
            }
            Err(e) => (
                Ok(serde_json::json!({
                    "content": [{ "type": "text", "text": e.to_string() }],
                    "isError": true
                })),
                "error",
            ),
        };
        metrics::counter!(
            "mcp_tool_calls_total",
            "tool" => tool_name.clone(),
            "status" => status_label
        )
        .increment(1);
        metrics::histogram!(
            "mcp_tool_duration_ms",
            "tool" => tool_name,
            "status" => status_label
        )
        .record(start.elapsed().as_secs_f64() * 1000.0);

        result
    }

    /// Handles resources/list.
    fn handle_list_resources(&self) -> DispatchResult {
        let resources: Vec<Value> = self
            .resources
            .list_resources()
            .iter()
            .map(|r| {
                serde_json::json!({
                    "uri": r.uri,
                    "name": r.name,
                    "description": r.description,
                    "mimeType": r.mime_type
                })
            })
            .collect();

        Ok(serde_json::json!({ "resources": resources }))
    }

    /// Handles resources/read.
    async fn handle_read_resource(&self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((-32602, "Missing params".to_string()))?;

        let uri = params
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing resource URI".to_string()))?;

        let span = info_span!("mcp.resource.read", resource.uri = uri);
        let start = Instant::now();

        let result = match self.resources.read_resource(uri).instrument(span).await {
            Ok(content) => Ok(serde_json::json!({
                "contents": [{
                    "uri": content.uri,
                    "mimeType": content.mime_type,
                    "text": content.text
                }]
            })),
            Err(Error::InvalidInput(msg)) => Err((-32602, msg)),
            Err(e) => Err((-32603, e.to_string())),
        };

        let status_label = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "mcp_resource_reads_total",
            "status" => status_label
        )
        .increment(1);
        metrics::histogram!(
            "mcp_resource_read_duration_ms",
            "status" => status_label
        )
        .record(start.elapsed().as_secs_f64() * 1000.0);

        result
    }

    /// Handles prompts/list.
    fn handle_list_prompts(&self) -> DispatchResult {
        let prompts: Vec<Value> = self
            .prompts
            .list_prompts()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "description": p.description,
                    "arguments": p.arguments.iter().map(|a| {
                        serde_json::json!({
                            "name": a.name,
                            "description": a.description,
                            "required": a.required
                        })
                    }).collect::<Vec<Value>>()
                })
            })
            .collect();

        Ok(serde_json::json!({ "prompts": prompts }))
    }

    /// Handles prompts/get.
    async fn handle_get_prompt(&self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((-32602, "Missing params".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing prompt name".to_string()))?;
        let span = info_span!("mcp.prompt.get", prompt.name = name);

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match self.prompts.get_prompt(name, &arguments).instrument(span).await {
            Ok(result) => Ok(serde_json::json!({
                "description": result.description,
                "messages": result.messages
            })),
            Err(Error::InvalidInput(msg)) => Err((-32602, msg)),
            Err(e) => Err((-32603, e.to_string())),
        }
    }
}

async fn write_line(stdout: &mut tokio::io::Stdout, line: &str) -> Result<()> {
    let write = async {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await
    };
    write.await.map_err(|e| Error::OperationFailed {
        operation: "write_stdout".to_string(),
        cause: e.to_string(),
    })?;
    stdout.flush().await.map_err(|e| Error::OperationFailed {
        operation: "flush_stdout".to_string(),
        cause: e.to_string(),
    })
}

/// Formats a successful response.
fn format_response(id: Option<Value>, result: DispatchResult) -> String {
    match result {
        Ok(value) => {
            let response = JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(value),
                error: None,
            };
            serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
        }
        Err((code, message)) => format_error(id, code, &message),
    }
}

/// Formats an error response.
fn format_error(id: Option<Value>, code: i32, message: &str) -> String {
    let response = JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
            data: None,
        }),
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

/// Result type for method dispatch.
type DispatchResult = std::result::Result<Value, (i32, String)>;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC version (required by protocol but not used in code).
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn server() -> McpServer {
        let client = ApiClient::new(&ServerConfig::new("http://localhost:1234", "pw")).unwrap();
        McpServer::new(client)
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("protocolVersion"));
        assert!(response.contains(PROTOCOL_VERSION));
        assert!(response.contains(SERVER_NAME));
    }

    #[tokio::test]
    async fn test_handle_list_tools() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("tools"));
        assert!(response.contains("bb_send_message"));
        assert!(response.contains("bb_list_chats"));
    }

    #[tokio::test]
    async fn test_handle_list_resources() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("resources"));
        assert!(response.contains("bluebubbles://chats"));
    }

    #[tokio::test]
    async fn test_handle_list_prompts() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"prompts/list"}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("prompts"));
        assert!(response.contains("summarize_chat"));
    }

    #[tokio::test]
    async fn test_handle_ping() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("result"));
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"unknown/method"}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("error"));
        assert!(response.contains("-32601"));
    }

    #[tokio::test]
    async fn test_handle_parse_error() {
        let request = "not valid json";
        let response = server().handle_request(request).await;

        assert!(response.contains("error"));
        assert!(response.contains("-32700"));
    }

    #[tokio::test]
    async fn test_handle_missing_params() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call"}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("error"));
        assert!(response.contains("-32602"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_error_not_protocol_error() {
        let request =
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"bb_nope"}}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("isError"));
        assert!(response.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_unknown_resource_is_invalid_params() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"resources/read","params":{"uri":"bluebubbles://nope"}}"#;
        let response = server().handle_request(request).await;

        assert!(response.contains("error"));
        assert!(response.contains("-32602"));
    }

    #[test]
    fn test_rate_limiter_exhausts_window_budget() {
        let config = RateLimitConfig::default()
            .with_max_requests(2)
            .with_window_secs(60);
        let mut limiter = RateLimiter::new(config);

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_rate_limiter_resets_after_window() {
        let config = RateLimitConfig::default()
            .with_max_requests(1)
            .with_window_secs(0);
        let mut limiter = RateLimiter::new(config);

        assert!(limiter.try_acquire());
        std::thread::sleep(Duration::from_millis(5));
        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_rate_limited_response_shape() {
        let server = server().with_rate_limit(RateLimitConfig::default().with_max_requests(0));
        let response = server.rate_limited_response();
        let parsed: Value = serde_json::from_str(&response).unwrap();

        assert_eq!(parsed["error"]["code"], -32000);
        assert!(parsed["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_oversized_request_is_rejected() {
        let request = format!(
            r#"{{"jsonrpc":"2.0","id":1,"method":"ping","params":{{"pad":"{}"}}}}"#,
            "x".repeat(MAX_REQUEST_BODY_SIZE)
        );
        let response = server().handle_request(&request).await;

        assert!(response.contains("-32600"));
        assert!(response.contains("Request too large"));
    }
}
