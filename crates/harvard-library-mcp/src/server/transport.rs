//! JSON-RPC types and the HTTP transport.
//!
//! `POST /mcp` speaks JSON-RPC 2.0 with the same dispatch as stdio. The REST
//! routes are thin wrappers that call the matching tool with JSON output.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ErrorKind, ToolError};
use crate::models::{RecordFormat, SortOrder};
use crate::tools::{McpTool, ToolContext};

/// Protocol version offered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// JSON-RPC version constant.
    const VERSION: &'static str = "2.0";

    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const TOOL_ERROR: i32 = -32000;

    #[must_use]
    pub const fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: Cow::Borrowed(Self::VERSION), result: Some(result), error: None, id }
    }

    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }

    /// Error response for a failed tool call, with the structured error in `data`.
    #[must_use]
    pub fn tool_error(id: Option<Value>, err: &ToolError) -> Self {
        let code = if err.kind() == Some(ErrorKind::Validation) { Self::INVALID_PARAMS } else { Self::TOOL_ERROR };
        let mut response = Self::error(id, code, err.to_user_message());
        if let Some(error) = response.error.as_mut() {
            error.data = Some(err.to_structured());
        }
        response
    }
}

/// MCP tool info for tools/list response.
#[derive(Debug, Serialize)]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Dispatch one JSON-RPC request.
///
/// Returns `None` for notifications, which get no response.
pub async fn handle_request(req: &JsonRpcRequest, tools: &[Box<dyn McpTool>], ctx: &ToolContext) -> Option<JsonRpcResponse> {
    let id = req.id.clone();
    let is_notification = id.is_none();

    let response = match req.method.as_str() {
        "initialize" => JsonRpcResponse::success(id, handle_initialize(&req.params)),
        "notifications/initialized" | "initialized" | "notifications/cancelled" => {
            if is_notification {
                return None;
            }
            JsonRpcResponse::success(id, json!({}))
        }
        "tools/list" => handle_tools_list(id, tools),
        "tools/call" => handle_tools_call(id, &req.params, tools, ctx).await,
        "ping" => JsonRpcResponse::success(id, json!({})),
        _ => {
            if is_notification {
                return None;
            }
            JsonRpcResponse::error(id, JsonRpcResponse::METHOD_NOT_FOUND, format!("Method not found: {}", req.method))
        }
    };

    Some(response)
}

fn handle_initialize(params: &Value) -> Value {
    let protocol_version = params.get("protocolVersion").and_then(Value::as_str).unwrap_or(DEFAULT_PROTOCOL_VERSION);

    tracing::info!("MCP initialize: protocol version {}", protocol_version);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": "harvard-library-mcp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn handle_tools_list(id: Option<Value>, tools: &[Box<dyn McpTool>]) -> JsonRpcResponse {
    let tool_list: Vec<McpToolInfo> = tools
        .iter()
        .map(|t| McpToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect();

    JsonRpcResponse::success(id, json!({ "tools": tool_list }))
}

async fn handle_tools_call(
    id: Option<Value>,
    params: &Value,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> JsonRpcResponse {
    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::error(id, JsonRpcResponse::INVALID_PARAMS, "Missing 'name' parameter");
    };

    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    let Some(tool) = tools.iter().find(|t| t.name() == tool_name) else {
        return JsonRpcResponse::error(id, JsonRpcResponse::INVALID_PARAMS, format!("Tool not found: {tool_name}"));
    };

    tracing::info!(tool = %tool_name, "Executing tool");

    match tool.execute(ctx, arguments).await {
        Ok(result) => JsonRpcResponse::success(
            id,
            json!({
                "content": [{
                    "type": "text",
                    "text": result
                }]
            }),
        ),
        Err(e) => {
            tracing::error!(tool = %tool_name, error = %e, "Tool execution failed");
            JsonRpcResponse::tool_error(id, &e)
        }
    }
}

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub tools: Vec<Box<dyn McpTool>>,
    pub ctx: ToolContext,
}

/// Create the HTTP router.
pub fn create_router(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> Router {
    let state = Arc::new(HttpState { tools, ctx });

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/mcp", post(handle_mcp_post))
        .route("/search", get(handle_search))
        .route("/search/advanced", post(handle_advanced_search))
        .route("/record/{id}", get(handle_record))
        .route("/collections", get(handle_collections))
        .route("/parse/mods", post(handle_parse_mods))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "harvard-library-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.tools.len()
    }))
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(State(state): State<Arc<HttpState>>, Json(req): Json<JsonRpcRequest>) -> Response {
    tracing::debug!(method = %req.method, "Handling MCP POST request");

    match handle_request(&req, &state.tools, &state.ctx).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Query string for `GET /search`.
///
/// Kept flat: form decoding cannot fill numbers through a flattened struct.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default, alias = "query")]
    pub q: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub origin_place: Option<String>,
    #[serde(default)]
    pub publication_place: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub format_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl SearchParams {
    /// Arguments for the `advanced_search` tool.
    #[must_use]
    pub fn to_arguments(&self) -> Value {
        let mut args = json!({
            "query": self.q,
            "title": self.title,
            "author": self.author,
            "subject": self.subject,
            "collection": self.collection,
            "origin_place": self.origin_place,
            "publication_place": self.publication_place,
            "language": self.language,
            "format_type": self.format_type,
            "start_date": self.start_date,
            "end_date": self.end_date,
            "sort_by": self.sort_by,
            "offset": self.offset.unwrap_or(0),
            "response_format": "json"
        });
        if let Some(order) = self.sort_order {
            args["sort_order"] = json!(order);
        }
        if let Some(limit) = self.limit {
            args["limit"] = json!(limit);
        }
        args
    }
}

/// Query string for `GET /record/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct RecordParams {
    #[serde(default)]
    pub source_format: RecordFormat,
}

async fn handle_search(State(state): State<Arc<HttpState>>, Query(params): Query<SearchParams>) -> Response {
    run_rest_tool(&state, "advanced_search", params.to_arguments()).await
}

async fn handle_advanced_search(State(state): State<Arc<HttpState>>, Json(mut args): Json<Value>) -> Response {
    force_json_output(&mut args);
    run_rest_tool(&state, "advanced_search", args).await
}

async fn handle_record(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
    Query(params): Query<RecordParams>,
) -> Response {
    let args = json!({
        "record_id": id,
        "source_format": params.source_format,
        "response_format": "json"
    });
    run_rest_tool(&state, "get_record_details", args).await
}

async fn handle_collections(State(state): State<Arc<HttpState>>) -> Response {
    run_rest_tool(&state, "get_collections_list", json!({ "response_format": "json" })).await
}

async fn handle_parse_mods(State(state): State<Arc<HttpState>>, Json(mut args): Json<Value>) -> Response {
    force_json_output(&mut args);
    run_rest_tool(&state, "parse_mods_metadata", args).await
}

fn force_json_output(args: &mut Value) {
    if let Some(obj) = args.as_object_mut() {
        obj.insert("response_format".to_string(), json!("json"));
    }
}

/// Run a tool for a REST route. Tool output is already JSON text.
async fn run_rest_tool(state: &HttpState, name: &str, args: Value) -> Response {
    let Some(tool) = state.tools.iter().find(|t| t.name() == name) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "kind": "internal", "message": format!("no tool {name}") })))
            .into_response();
    };

    tracing::info!(tool = %name, "Executing tool via REST");

    match tool.execute(&state.ctx, args).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::warn!(tool = %name, error = %e, "REST tool call failed");
            (rest_status(&e), Json(e.to_structured())).into_response()
        }
    }
}

/// HTTP status for a failed REST call.
#[must_use]
pub fn rest_status(err: &ToolError) -> StatusCode {
    match err.kind() {
        Some(ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::UpstreamRejected) => match err {
            ToolError::Client(e) if e.status() == Some(404) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        },
        Some(ErrorKind::TransientUpstream) => StatusCode::SERVICE_UNAVAILABLE,
        Some(ErrorKind::TotalParse) => StatusCode::BAD_GATEWAY,
        Some(ErrorKind::Cancellation) => StatusCode::GATEWAY_TIMEOUT,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
