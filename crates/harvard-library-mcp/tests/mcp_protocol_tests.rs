//! MCP protocol tests: JSON-RPC over the line transport and the HTTP router.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::BufReader;
use wiremock::MockServer;

use harvard_library_mcp::client::CatalogClient;
use harvard_library_mcp::config::Config;
use harvard_library_mcp::server::stdio::serve_lines;
use harvard_library_mcp::server::transport::{JsonRpcResponse, create_router};
use harvard_library_mcp::tools::{ToolContext, register_all_tools};

const MODS: &str = "<mods><titleInfo><title>Walden</title></titleInfo>\
<recordInfo><recordIdentifier>w1</recordIdentifier></recordInfo></mods>";

fn offline_context() -> ToolContext {
    // Nothing listens here; tests below never reach the catalog.
    let client = CatalogClient::new(Config::for_testing("http://127.0.0.1:9")).unwrap();
    ToolContext::new(Arc::new(client))
}

/// Feed newline-separated messages through the line transport and collect the replies.
async fn exchange(messages: &[Value]) -> Vec<Value> {
    let input: String = messages.iter().map(|m| format!("{m}\n")).collect();
    let mut output = Vec::new();

    serve_lines(BufReader::new(input.as_bytes()), &mut output, &register_all_tools(), &offline_context())
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// =============================================================================
// Line transport
// =============================================================================

#[tokio::test]
async fn test_initialize_handshake() {
    let replies = exchange(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
    ])
    .await;

    // The notification gets no reply.
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["id"], 1);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(replies[0]["result"]["serverInfo"]["name"], "harvard-library-mcp");
    assert_eq!(replies[0]["result"]["capabilities"]["tools"]["listChanged"], false);
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["result"], json!({}));
}

#[tokio::test]
async fn test_tools_list() {
    let replies = exchange(&[json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"})]).await;

    let tools = replies[0]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);
    for tool in tools {
        assert!(tool["name"].is_string());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
}

#[tokio::test]
async fn test_unknown_method_and_bad_json() {
    let input = "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"resources/list\"}\n\n{not json\n";
    let mut output = Vec::new();
    serve_lines(BufReader::new(input.as_bytes()), &mut output, &register_all_tools(), &offline_context())
        .await
        .unwrap();

    let replies: Vec<Value> =
        String::from_utf8(output).unwrap().lines().map(|l| serde_json::from_str(l).unwrap()).collect();

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["error"]["code"], JsonRpcResponse::METHOD_NOT_FOUND);
    assert_eq!(replies[1]["error"]["code"], JsonRpcResponse::PARSE_ERROR);
    assert!(replies[1].get("id").is_none());
}

#[tokio::test]
async fn test_tools_call_parse_mods() {
    let replies = exchange(&[json!({
        "jsonrpc": "2.0",
        "id": 9,
        "method": "tools/call",
        "params": {"name": "parse_mods_metadata", "arguments": {"mods_xml": MODS}}
    })])
    .await;

    let content = &replies[0]["result"]["content"][0];
    assert_eq!(content["type"], "text");
    let record: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(record["id"], "w1");
    assert_eq!(record["title"], "Walden");
}

#[tokio::test]
async fn test_tools_call_errors() {
    let replies = exchange(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "no_such_tool"}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {}}),
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "search_by_date_range", "arguments": {"start_date": "2001-01-01", "end_date": "2000-01-01"}}
        }),
    ])
    .await;

    assert_eq!(replies[0]["error"]["code"], JsonRpcResponse::INVALID_PARAMS);
    assert_eq!(replies[1]["error"]["code"], JsonRpcResponse::INVALID_PARAMS);

    let error = &replies[2]["error"];
    assert_eq!(error["code"], JsonRpcResponse::INVALID_PARAMS);
    assert_eq!(error["data"]["kind"], "validation");
}

#[tokio::test]
async fn test_upstream_failure_is_tool_error() {
    let mock_server = MockServer::start().await;
    // No mocks mounted: every request gets wiremock's default 404.
    let client = CatalogClient::new(Config::for_testing(&mock_server.uri())).unwrap();
    let ctx = ToolContext::new(Arc::new(client));

    let input = format!(
        "{}\n",
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "get_record_details", "arguments": {"record_id": "990001"}}
        })
    );
    let mut output = Vec::new();
    serve_lines(BufReader::new(input.as_bytes()), &mut output, &register_all_tools(), &ctx).await.unwrap();

    let reply: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(reply["error"]["code"], JsonRpcResponse::TOOL_ERROR);
    assert_eq!(reply["error"]["data"]["kind"], "upstream_rejected");
    assert_eq!(reply["error"]["data"]["status"], 404);
}

// =============================================================================
// HTTP transport
// =============================================================================

async fn spawn_http() -> SocketAddr {
    let router = create_router(register_all_tools(), offline_context());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_http_routes() {
    let addr = spawn_http().await;
    let http = reqwest::Client::new();
    let base = format!("http://{addr}");

    let health: Value = http.get(format!("{base}/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["tools"], 11);

    let collections: Value = http.get(format!("{base}/collections")).send().await.unwrap().json().await.unwrap();
    assert!(collections["count"].as_u64().unwrap() > 0);

    let parsed = http.post(format!("{base}/parse/mods")).json(&json!({"mods_xml": MODS})).send().await.unwrap();
    assert_eq!(parsed.status(), 200);
    let record: Value = parsed.json().await.unwrap();
    assert_eq!(record["id"], "w1");

    let bad = http.get(format!("{base}/record/bad%20id")).send().await.unwrap();
    assert_eq!(bad.status(), 400);
    let body: Value = bad.json().await.unwrap();
    assert_eq!(body["kind"], "validation");

    let inverted = http
        .get(format!("{base}/search?start_date=2000-01-02&end_date=2000-01-01"))
        .send()
        .await
        .unwrap();
    assert_eq!(inverted.status(), 400);
}

#[tokio::test]
async fn test_http_jsonrpc() {
    let addr = spawn_http().await;
    let http = reqwest::Client::new();

    let reply: Value = http
        .post(format!("http://{addr}/mcp"))
        .json(&json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["result"]["tools"].as_array().unwrap().len(), 11);

    let notification = http
        .post(format!("http://{addr}/mcp"))
        .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .send()
        .await
        .unwrap();
    assert_eq!(notification.status(), 202);
}
