//! Line-delimited JSON-RPC server exposing the operation registry as MCP
//! tools over stdin/stdout.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::engine::Engine;
use crate::error::ActResult;
use crate::tools::{self, OPERATIONS};

use super::protocol::{
    error_codes, methods, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION,
};

/// MCP server bound to one engine.
#[derive(Debug, Clone)]
pub struct McpServer {
    engine: Arc<Engine>,
}

impl McpServer {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Serve requests until `reader` reaches EOF.
    ///
    /// Each input line is one request; each response is written as one line.
    /// Notifications get no response.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> ActResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }
        log::info!("MCP input closed, shutting down");
        Ok(())
    }

    /// Handle one raw input line.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                log::warn!("Unparseable MCP request: {}", e);
                Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle one decoded request.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                "jsonrpc must be \"2.0\"",
            ));
        }
        log::debug!("MCP {}", request.method);
        let response = match request.method.as_str() {
            methods::INITIALIZE => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {"listChanged": false}},
                    "serverInfo": {"name": "act-engine", "version": crate::VERSION},
                }),
            ),
            methods::INITIALIZED => return None,
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => {
                let tools: Vec<Value> = OPERATIONS.iter().map(|op| op.describe()).collect();
                JsonRpcResponse::success(id, json!({ "tools": tools }))
            }
            methods::TOOLS_CALL => self.call_tool(id, request.params).await,
            // Other notifications are ignored.
            other if request.id.is_none() && other.starts_with("notifications/") => return None,
            other => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    async fn call_tool(
        &self,
        id: Option<super::protocol::JsonRpcId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params = params.unwrap_or(Value::Null);
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "tools/call requires a string 'name'",
            );
        };
        if tools::find(name).is_none() {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Unknown tool: {}", name),
            );
        }
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
        let envelope = tools::dispatch(&self.engine, name, arguments).await;
        JsonRpcResponse::success(
            id,
            json!({
                "content": [{"type": "text", "text": envelope.to_value().to_string()}],
                "isError": !envelope.ok,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::JsonRpcId;

    fn server() -> McpServer {
        McpServer::new(Arc::new(Engine::builtin().unwrap()))
    }

    fn envelope(resp: &JsonRpcResponse) -> Value {
        let text = resp.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_list() {
        let s = server();
        let init = s
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(init.result.unwrap()["serverInfo"]["name"], "act-engine");

        let note = s
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(note.is_none());

        let list = s
            .handle_line(r#"{"jsonrpc":"2.0","id":"two","method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(list.id, Some(JsonRpcId::String("two".into())));
        let tools = list.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, OPERATIONS.len());
    }

    #[tokio::test]
    async fn test_tools_call_wraps_envelope() {
        let s = server();
        let ok = s
            .handle_line(
                r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"lookup","arguments":{"label":"nurse","role":"identity"}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(ok.result.as_ref().unwrap()["isError"], false);
        assert_eq!(envelope(&ok)["data"]["term"], "nurse");

        let failed = s
            .handle_line(
                r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"lookup","arguments":{"label":"ghost","role":"identity"}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(failed.result.as_ref().unwrap()["isError"], true);
        assert_eq!(envelope(&failed)["error"]["error_code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let s = server();
        let parse = s.handle_line("{not json").await.unwrap();
        assert_eq!(parse.error.unwrap().code, error_codes::PARSE_ERROR);

        let unknown = s
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(unknown.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let bad = s
            .handle_line(
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"warp"}}"#,
            )
            .await
            .unwrap();
        assert_eq!(bad.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_run_over_buffers() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"closest","arguments":{"epa":[2.53,2.35,0.41],"n":1}}}"#,
            "\n",
        );
        let mut output = Vec::new();
        server()
            .run(tokio::io::BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();
        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        let text = lines[1]["result"]["content"][0]["text"].as_str().unwrap();
        let env: Value = serde_json::from_str(text).unwrap();
        assert_eq!(env["data"][0]["label"], "doctor");
    }
}
