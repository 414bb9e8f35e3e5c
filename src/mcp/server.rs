//! MCP server loop
//!
//! Reads newline-delimited JSON-RPC messages from stdin and writes
//! responses to stdout. stdout carries nothing but protocol frames;
//! all logging goes through tracing (stderr or file).

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::{
    INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION, InitializeResult, LoggingCapability, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolCallResult, ToolsCapability,
};
use crate::tools::ToolRegistry;

const INSTRUCTIONS: &str = "This MCP server provides read-only monitoring and debugging of \
GitOps infrastructure.\n\n\
Available capabilities:\n\
- Query Flux Kustomization, GitRepository, and HelmRelease status\n\
- Check CAPI cluster and machine health\n\
- Get application deployment status across workspaces\n\
- Debug reconciliation failures\n\
- Check policy violations (Gatekeeper/Kyverno)\n\n\
When debugging issues:\n\
1. First check the Kustomization status\n\
2. Then check events for the affected resources\n\
3. Look at pod logs if needed\n\
4. Check for policy violations";

/// MCP server bound to a tool registry
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Process messages from stdin until EOF
    pub async fn run(&self) -> Result<()> {
        tracing::info!("MCP server started, waiting for messages");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await.context("stdin read error")? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let raw = serde_json::to_string(&response)
                    .context("Failed to serialize response")?;
                stdout.write_all(raw.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("EOF received, shutting down");
        Ok(())
    }

    /// Handle one JSON-RPC message; `None` means no response (notification)
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(_) => return Some(JsonRpcResponse::failure(None, PARSE_ERROR, "Parse error")),
        };

        tracing::debug!("Received request: method={} id={:?}", request.method, request.id);

        // Notifications get no response
        if request.id.is_none() {
            match request.method.as_str() {
                "initialized" | "notifications/initialized" => {
                    tracing::info!("Client initialized");
                }
                "notifications/cancelled" => tracing::debug!("Request cancelled"),
                other => tracing::debug!("Unknown notification: {}", other),
            }
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            // Some clients send this as a request rather than a notification
            "initialized" => return None,
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({"tools": self.registry.tools()}),
            ),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => JsonRpcResponse::success(id, json!({"resources": []})),
            "prompts/list" => JsonRpcResponse::success(id, json!({"prompts": []})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            other => JsonRpcResponse::failure(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                logging: Some(LoggingCapability {}),
            },
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
            instructions: INSTRUCTIONS,
        };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or_default())
    }

    async fn handle_tools_call(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            _ => return JsonRpcResponse::failure(id, INVALID_PARAMS, "Invalid params"),
        };

        tracing::debug!("Tool call: {}", params.name);

        let result = match self.registry.call(&params.name, &params.arguments).await {
            None => {
                return JsonRpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    format!("Unknown tool: {}", params.name),
                );
            }
            Some(Ok(text)) => ToolCallResult::text(text),
            Some(Err(e)) => {
                tracing::warn!("Tool {} rejected invocation: {}", params.name, e);
                ToolCallResult::error(format!("Error: {}", e))
            }
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or_default())
    }
}
