//! MCP Server core implementation
//!
//! [`PlaybookMcpServer`] is the context every transport hands requests to.
//! It is built once at start-up around a [`PlaybookService`] and shared by
//! all handlers.

use serde_json::json;

use super::protocol::*;
use super::{resources, tools};
use playbook_core::PlaybookService;

/// The Playbook MCP Server
#[derive(Clone)]
pub struct PlaybookMcpServer {
    /// Server name
    name: String,
    /// Server version
    version: String,
    /// Playbook operations behind every tool and resource
    service: PlaybookService,
}

impl PlaybookMcpServer {
    /// Create a new Playbook MCP Server over `service`
    pub fn new(service: PlaybookService) -> Self {
        Self {
            name: "playbook-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service,
        }
    }

    /// Get server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get server version
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn service(&self) -> &PlaybookService {
        &self.service
    }

    /// Handle a JSON-RPC request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "resources/list" => self.handle_list_resources(id).await,
            "resources/read" => self.handle_read_resource(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, json!({})),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Option<serde_json::Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: Some(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: self.version.clone(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(
        &self,
        id: Option<serde_json::Value>,
        params: serde_json::Value,
    ) -> JsonRpcResponse {
        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        match tools::handle_tool_call(&self.service, name, arguments).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": content,
                    "isError": false
                }),
            ),
            Err(e) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": format!("Error: {}", e)}],
                    "isError": true
                }),
            ),
        }
    }

    async fn handle_list_resources(&self, id: Option<serde_json::Value>) -> JsonRpcResponse {
        match resources::get_resource_definitions(&self.service).await {
            Ok(resources) => JsonRpcResponse::success(id, json!({ "resources": resources })),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_read_resource(
        &self,
        id: Option<serde_json::Value>,
        params: serde_json::Value,
    ) -> JsonRpcResponse {
        let uri = params.get("uri").and_then(|v| v.as_str()).unwrap_or("");

        match resources::read_resource(&self.service, uri).await {
            Ok(content) => JsonRpcResponse::success(id, json!({ "contents": [content] })),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }
}

fn handle_list_tools(id: Option<serde_json::Value>) -> JsonRpcResponse {
    let tools = tools::get_tool_definitions();
    JsonRpcResponse::success(id, json!({ "tools": tools }))
}
