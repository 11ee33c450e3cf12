//! MCP (Model Context Protocol) Server
//!
//! Exposes the plugin functions as MCP tools using manual JSON-RPC 2.0 over
//! stdio.
//!
//! # Architecture
//!
//! - **Transport**: JSON-RPC 2.0 over stdio (line-based)
//! - **Dependencies**: `serde_json` and anyhow (no MCP-specific crates)
//! - **Tools**: one per [`FunctionDescriptor`], with the descriptor's
//!   description and argument schema
//!
//! Tool results always have `isError: false`. The plugin functions already
//! turn failures into an empty string, and that string is what the planner
//! receives.
//!
//! # Usage
//!
//! Start the MCP server with: `sqlplugin mcp`
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "northwind": {
//!       "command": "sqlplugin",
//!       "args": ["--database", "northwind.db", "mcp"]
//!     }
//!   }
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};

use crate::engine::DatabaseEngine;
use crate::plugin::{GetTableSchemaArgs, RunQueryArgs, SqlPlugin};

// ============================================================================
// JSON-RPC 2.0 Structures
// ============================================================================

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn result(id: Option<Value>, value: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(value), error: None }
    }

    fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

// ============================================================================
// MCP Tool Result Structures
// ============================================================================

/// Text content block for MCP tool results
#[derive(Debug, Serialize)]
struct TextContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

/// MCP tool call result
#[derive(Debug, Serialize)]
struct CallToolResult {
    content: Vec<TextContent>,
    #[serde(rename = "isError")]
    is_error: bool,
}

impl CallToolResult {
    fn text(text: String) -> Result<Value> {
        let result = Self {
            content: vec![TextContent { content_type: "text".to_string(), text }],
            is_error: false,
        };
        Ok(serde_json::to_value(result)?)
    }
}

// ============================================================================
// MCP Server
// ============================================================================

/// Run the MCP server loop until stdin closes
///
/// Each request is one line of JSON; each response is one line of JSON.
///
/// # Errors
///
/// Returns an error if stdio communication fails.
#[allow(clippy::future_not_send)]
pub async fn serve<E: DatabaseEngine>(plugin: &SqlPlugin<E>) -> Result<()> {
    let stdin = io::stdin();
    let reader = stdin.lock();
    let mut stdout = io::stdout();

    log::info!("MCP server listening on stdio, database {}", plugin.config().file.display());

    for line in reader.lines() {
        let line = line?;
        if let Some(response) = respond(plugin, &line).await? {
            writeln!(stdout, "{response}")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Handle one input line, returning the serialized response if one is due
///
/// Blank lines and notifications (requests without an id) get no response.
///
/// # Errors
///
/// Fails only if the response cannot be serialized.
pub async fn respond<E: DatabaseEngine>(
    plugin: &SqlPlugin<E>,
    line: &str,
) -> Result<Option<String>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let response = match serde_json::from_str::<JsonRpcRequest>(line) {
        Ok(request) if request.id.is_none() => {
            log::debug!("notification {}", request.method);
            return Ok(None);
        }
        Ok(request) => handle_request(plugin, request).await,
        Err(e) => JsonRpcResponse::error(None, -32700, format!("Parse error: {e}")),
    };

    Ok(Some(serde_json::to_string(&response)?))
}

/// Route a request to its handler by method name
async fn handle_request<E: DatabaseEngine>(
    plugin: &SqlPlugin<E>,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    let result = match request.method.as_str() {
        "initialize" => Ok(handle_initialize()),
        "tools/list" => handle_list_tools::<E>(),
        "tools/call" => handle_call_tool(plugin, request.params).await,
        _ => Err(anyhow!("Unknown method: {}", request.method)),
    };

    match result {
        Ok(value) => JsonRpcResponse::result(request.id, value),
        Err(e) => JsonRpcResponse::error(request.id, -32603, e.to_string()),
    }
}

// ============================================================================
// MCP Protocol Handlers
// ============================================================================

fn handle_initialize() -> Value {
    serde_json::json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "sqlplugin",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn handle_list_tools<E: DatabaseEngine>() -> Result<Value> {
    let tools = SqlPlugin::<E>::functions()
        .into_iter()
        .map(|f| {
            Ok(serde_json::json!({
                "name": f.name,
                "description": f.description,
                "inputSchema": serde_json::to_value(&f.parameters)?,
            }))
        })
        .collect::<Result<Vec<Value>>>()?;

    Ok(serde_json::json!({ "tools": tools }))
}

async fn handle_call_tool<E: DatabaseEngine>(
    plugin: &SqlPlugin<E>,
    params: Option<Value>,
) -> Result<Value> {
    let params = params.ok_or_else(|| anyhow!("Missing params"))?;
    let name = params["name"].as_str().ok_or_else(|| anyhow!("Missing tool name"))?;
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    let text = match name {
        "list_tables" => plugin.list_tables().await,
        "get_table_schema" => {
            let args: GetTableSchemaArgs = parse_arguments(name, arguments)?;
            plugin.get_table_schema(&args.table_name).await
        }
        "run_query" => {
            let args: RunQueryArgs = parse_arguments(name, arguments)?;
            plugin.run_query(&args.query).await
        }
        _ => return Err(anyhow!("Unknown tool: {name}")),
    };

    CallToolResult::text(text)
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| anyhow!("Invalid arguments for {tool}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plugin_with_table(name: &str) -> (SqlPlugin, PathBuf) {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir()
            .join(format!("sqlplugin_mcp_{name}_{}_{id}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let conn = rusqlite::Connection::open(&path).expect("Failed to create temp database");
            conn.execute(
                "CREATE TABLE Shippers (ShipperID INTEGER PRIMARY KEY, CompanyName TEXT)",
                [],
            )
            .expect("Failed to create table");
            conn.execute("INSERT INTO Shippers (CompanyName) VALUES ('Speedy Express')", [])
                .expect("Failed to insert");
        }
        (SqlPlugin::new(path.clone()), path)
    }

    async fn call(plugin: &SqlPlugin, request: Value) -> Value {
        let line = respond(plugin, &request.to_string()).await.unwrap().expect("response");
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let (plugin, path) = plugin_with_table("initialize");
        let response =
            call(&plugin, serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
                .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["serverInfo"]["name"], "sqlplugin");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_list_tools() {
        let (plugin, path) = plugin_with_table("list_tools");
        let response =
            call(&plugin, serde_json::json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
                .await;

        let tools = response["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["list_tables", "get_table_schema", "run_query"]);
        assert_eq!(tools[2]["inputSchema"]["required"], serde_json::json!(["query"]));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_call_run_query() {
        let (plugin, path) = plugin_with_table("run_query");
        let response = call(
            &plugin,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {
                    "name": "run_query",
                    "arguments": {"query": "SELECT ShipperID, CompanyName FROM Shippers"}
                }
            }),
        )
        .await;

        assert_eq!(response["result"]["isError"], false);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "ShipperID,CompanyName\n1,Speedy Express\n"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_call_list_tables_without_arguments() {
        let (plugin, path) = plugin_with_table("list_tables");
        let response = call(
            &plugin,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "list_tables"}
            }),
        )
        .await;

        assert_eq!(response["result"]["content"][0]["text"], "name\nShippers\n");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_failed_query_is_empty_text_not_error() {
        let (plugin, path) = plugin_with_table("failed_query");
        let response = call(
            &plugin,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 5,
                "method": "tools/call",
                "params": {"name": "run_query", "arguments": {"query": "SELECT * FROM NoSuchTable"}}
            }),
        )
        .await;

        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(response["result"]["content"][0]["text"], "");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_argument_is_rpc_error() {
        let (plugin, path) = plugin_with_table("missing_argument");
        let response = call(
            &plugin,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "tools/call",
                "params": {"name": "get_table_schema", "arguments": {}}
            }),
        )
        .await;

        assert_eq!(response["error"]["code"], -32603);
        assert!(response["error"]["message"].as_str().unwrap().contains("get_table_schema"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_method() {
        let (plugin, path) = plugin_with_table("unknown");

        let response = call(
            &plugin,
            serde_json::json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": {"name": "drop_everything"}
            }),
        )
        .await;
        assert!(response["error"]["message"].as_str().unwrap().contains("Unknown tool"));

        let request = serde_json::json!({"jsonrpc": "2.0", "id": 8, "method": "resources/list"});
        let response = call(&plugin, request).await;
        assert!(response["error"]["message"].as_str().unwrap().contains("Unknown method"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_parse_error_blank_line_and_notification() {
        let (plugin, path) = plugin_with_table("parse");

        let line = respond(&plugin, "{not json").await.unwrap().unwrap();
        let response: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(response["error"]["code"], -32700);

        assert!(respond(&plugin, "   ").await.unwrap().is_none());

        let notification = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(respond(&plugin, notification).await.unwrap().is_none());
        let _ = std::fs::remove_file(&path);
    }
}
