//! HTTP transport for MCP
//!
//! Serves JSON-RPC on `POST /mcp` next to a small REST API for web clients.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::error::ServerError;
use crate::mcp::protocol::*;
use crate::mcp::PlaybookMcpServer;
use playbook_core::document::DEFAULT_TOP_K;
use playbook_core::{Playbook, PlaybookQuery};

/// REST API request for playbook ingestion
#[derive(Debug, Deserialize)]
pub struct IngestApiRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct HttpServerState {
    /// The MCP server instance
    server: Arc<PlaybookMcpServer>,
}

impl HttpServerState {
    pub fn new(server: PlaybookMcpServer) -> Self {
        Self {
            server: Arc::new(server),
        }
    }
}

/// Build the router for `state`
pub fn router(state: HttpServerState) -> Router {
    // Configure CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // MCP JSON-RPC endpoint
        .route("/mcp", post(handle_mcp_request))
        // REST API endpoints for web clients
        .route(
            "/api/playbooks",
            get(handle_api_list).post(handle_api_ingest),
        )
        .route(
            "/api/playbooks/:title",
            get(handle_api_get).delete(handle_api_delete),
        )
        .route("/api/query", post(handle_api_query))
        .route("/api/stats", get(handle_api_stats))
        // Health check
        .route("/health", get(handle_health))
        // Server info
        .route("/", get(handle_info))
        .layer(cors)
        .with_state(state)
}

/// Run the MCP server using HTTP transport
pub async fn run_http_server(addr: &str, server: PlaybookMcpServer) -> Result<(), ServerError> {
    tracing::info!("Starting HTTP transport on {}", addr);

    let app = router(HttpServerState::new(server));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(ServerError::IoError)?;

    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::IoError(std::io::Error::other(e)))?;

    Ok(())
}

/// Handle MCP JSON-RPC requests. Notifications are acknowledged with 202.
async fn handle_mcp_request(
    State(state): State<HttpServerState>,
    payload: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("Unparseable MCP request: {}", rejection.body_text());
            let response = JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                format!("Parse error: {}", rejection.body_text()),
            );
            return Json(response).into_response();
        }
    };

    tracing::debug!("HTTP request: {:?}", request.method);

    match state.server.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ============================================================================
// REST API Endpoints (for web clients)
// ============================================================================

/// GET /api/playbooks - List stored playbook titles
async fn handle_api_list(
    State(state): State<HttpServerState>,
) -> Result<Json<Value>, ServerError> {
    let titles = state.server.service().list_playbooks().await?;
    Ok(Json(json!({
        "success": true,
        "count": titles.len(),
        "playbooks": titles
    })))
}

/// POST /api/playbooks - Ingest a playbook
async fn handle_api_ingest(
    State(state): State<HttpServerState>,
    payload: Result<Json<IngestApiRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ServerError> {
    let Json(request) = payload?;
    let playbook = state
        .server
        .service()
        .create_playbook(
            request.title,
            request.content,
            request.description,
            request.tags,
            request.author,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "playbook": playbook })),
    ))
}

/// GET /api/playbooks/:title - Fetch one playbook
async fn handle_api_get(
    State(state): State<HttpServerState>,
    Path(title): Path<String>,
) -> Result<Json<Value>, ServerError> {
    let playbook = state
        .server
        .service()
        .get_playbook(&title)
        .await?
        .ok_or(ServerError::PlaybookNotFound(title))?;

    Ok(Json(json!({ "success": true, "playbook": &*playbook })))
}

/// DELETE /api/playbooks/:title - Remove one playbook
async fn handle_api_delete(
    State(state): State<HttpServerState>,
    Path(title): Path<String>,
) -> Result<Json<Value>, ServerError> {
    if !state.server.service().delete_playbook(&title).await? {
        return Err(ServerError::PlaybookNotFound(title));
    }
    Ok(Json(json!({ "success": true, "deleted": title })))
}

/// POST /api/query - Ranked search
async fn handle_api_query(
    State(state): State<HttpServerState>,
    payload: Result<Json<PlaybookQuery>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(query) = payload?;
    let results = state.server.service().query(&query).await?;
    let playbooks: Vec<&Playbook> = results.iter().map(|p| p.as_ref()).collect();

    Ok(Json(json!({
        "success": true,
        "count": playbooks.len(),
        "playbooks": playbooks
    })))
}

/// GET /api/stats - Storage statistics
async fn handle_api_stats(
    State(state): State<HttpServerState>,
) -> Result<Json<BTreeMap<String, usize>>, ServerError> {
    Ok(Json(state.server.service().get_stats().await?))
}

/// Health check endpoint
async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "playbook-mcp-server"
    }))
}

/// Server info endpoint
async fn handle_info(State(state): State<HttpServerState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "http",
        "default_top_k": DEFAULT_TOP_K,
        "endpoints": {
            "mcp": "/mcp",
            "api_playbooks": "/api/playbooks",
            "api_query": "/api/query",
            "api_stats": "/api/stats",
            "health": "/health"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use playbook_core::PlaybookConfig;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let server = PlaybookMcpServer::new(PlaybookConfig::default().build_service());
        router(HttpServerState::new(server))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_test_app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_mcp_ping_and_notification() {
        let app = create_test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/mcp",
            Some(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert!(body["result"].is_object());

        let (status, body) = send(
            &app,
            "POST",
            "/mcp",
            Some(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_rest_lifecycle() {
        let app = create_test_app();

        let (status, _) = send(
            &app,
            "POST",
            "/api/playbooks",
            Some(json!({
                "title": "Deploy Service",
                "content": "Run the deploy pipeline",
                "description": "Deployment steps",
                "tags": ["deploy"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, "GET", "/api/playbooks", None).await;
        assert_eq!(body["playbooks"], json!(["Deploy Service"]));

        let (status, body) = send(&app, "GET", "/api/playbooks/Deploy%20Service", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["playbook"]["content"], "Run the deploy pipeline");

        let (_, body) = send(
            &app,
            "POST",
            "/api/query",
            Some(json!({"question": "deploy"})),
        )
        .await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["playbooks"][0]["metadata"]["title"], "Deploy Service");

        let (_, body) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(body, json!({"total_playbooks": 1}));

        let (status, _) = send(&app, "DELETE", "/api/playbooks/Deploy%20Service", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/api/playbooks/Deploy%20Service", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_query_rejects_out_of_range_top_k() {
        let app = create_test_app();

        for body in [
            json!({"question": "deploy", "top_k": 50}),
            json!({"question": "deploy", "top_k": 0}),
            json!({"question": "deploy", "top_k": -1}),
            json!({"top_k": 3}),
        ] {
            let (status, response) = send(&app, "POST", "/api/query", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["success"], false);
            assert_eq!(response["code"], "INVALID_REQUEST");
            assert!(response["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_ingest_rejects_malformed_body() {
        let app = create_test_app();
        let (status, response) = send(
            &app,
            "POST",
            "/api/playbooks",
            Some(json!({"title": "No Content"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_mcp_unparseable_body_is_parse_error() {
        let app = create_test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], PARSE_ERROR);
        assert!(body["id"].is_null());
    }
}
