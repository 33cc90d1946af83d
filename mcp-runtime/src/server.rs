use std::io;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::client::SingularityClient;
use crate::dispatch::execute_tool;
use crate::framing::{Framing, Inbound, read_message, write_message};
use crate::tools::tools_list_payload;

/// Newest first; the first entry is offered when the client asks for something else.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];
const MCP_SERVER_NAME: &str = "singularity-mcp";

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Failed to read MCP message: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write MCP response: {0}")]
    Write(#[source] io::Error),
}

/// Text result of one tool call, as shown to the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutcome {
    fn success(result: &Value) -> Self {
        Self {
            text: to_pretty_json(result),
            is_error: false,
        }
    }

    fn failure(message: impl std::fmt::Display) -> Self {
        let message = message.to_string().replace(['\r', '\n'], " ");
        Self {
            text: format!("Error: {message}"),
            is_error: true,
        }
    }

    fn to_value(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error,
        })
    }
}

pub struct McpServer {
    client: SingularityClient,
}

impl McpServer {
    pub fn new(client: SingularityClient) -> Self {
        Self { client }
    }

    pub async fn serve_stdio(self: Arc<Self>) -> Result<(), ServeError> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serves until `reader` reaches end of input.
    ///
    /// Each request runs on its own task; a single writer task serializes the
    /// responses, so they may leave in a different order than requests arrived.
    /// In-flight calls are allowed to finish before this returns.
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, writer: W) -> Result<(), ServeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<(Framing, Value)>();
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some((framing, response)) = rx.recv().await {
                write_message(&mut writer, framing, &response).await?;
            }
            Ok::<(), io::Error>(())
        });

        let mut in_flight = JoinSet::new();
        let read_result = loop {
            let frame = match read_message(&mut reader).await {
                Ok(Some(frame)) => frame,
                Ok(None) => break Ok(()),
                Err(err) => break Err(ServeError::Read(err)),
            };
            while in_flight.try_join_next().is_some() {}

            match frame.payload {
                Inbound::Malformed(reason) => {
                    warn!(reason = %reason, "malformed MCP message");
                    let response = error_response(Value::Null, RpcError::parse_error(reason));
                    let _ = tx.send((frame.framing, response));
                }
                Inbound::Message(message) => {
                    let server = Arc::clone(&self);
                    let tx = tx.clone();
                    let framing = frame.framing;
                    in_flight.spawn(async move {
                        if let Some(response) = server.handle_incoming_message(message).await {
                            let _ = tx.send((framing, response));
                        }
                    });
                }
            }
        };

        while in_flight.join_next().await.is_some() {}
        drop(tx);
        let write_result = match writer_task.await {
            Ok(result) => result.map_err(ServeError::Write),
            Err(join_err) => Err(ServeError::Write(io::Error::other(join_err))),
        };
        read_result?;
        write_result
    }

    /// Handles one decoded message, which may be a batch. `None` when nothing
    /// needs to be sent back (notifications, client responses).
    pub async fn handle_incoming_message(&self, incoming: Value) -> Option<Value> {
        let Value::Array(batch) = incoming else {
            return self.handle_single_message(incoming).await;
        };
        if batch.is_empty() {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Batch request must not be empty"),
            ));
        }
        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = self.handle_single_message(item).await {
                responses.push(response);
            }
        }
        (!responses.is_empty()).then_some(Value::Array(responses))
    }

    async fn handle_single_message(&self, incoming: Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            // A response to something we never send.
            return None;
        };

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        match obj.get("id").cloned() {
            Some(id) => Some(match self.handle_request(method, params).await {
                Ok(payload) => success_response(id, payload),
                Err(err) => error_response(id, err),
            }),
            None => {
                debug!(method, "notification ignored");
                None
            }
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self, params: &Value) -> Value {
        let requested = params.get("protocolVersion").and_then(Value::as_str);
        let version = requested
            .filter(|version| SUPPORTED_PROTOCOL_VERSIONS.contains(version))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);
        info!(
            requested = requested.unwrap_or("<none>"),
            negotiated = version,
            zone = %self.client.zone().describe(),
            "MCP session initialized"
        );
        json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Tools for the SingularityApp task manager. Task ids start with T-, project ids with P-. Tasks created without a project land in the Inbox."
        })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        Ok(self.call_tool(name, &args).await.to_value())
    }

    /// Runs one tool. Never fails: every error becomes an error outcome.
    pub async fn call_tool(&self, name: &str, args: &Map<String, Value>) -> ToolOutcome {
        let call_id = Uuid::now_v7();
        let span = info_span!("tool_call", tool = name, call_id = %call_id);
        async {
            info!("tool called");
            let arguments = Value::Object(args.clone());
            debug!(arguments = %arguments, "tool arguments");
            match execute_tool(&self.client, name, args).await {
                Ok(result) => {
                    info!("tool succeeded");
                    ToolOutcome::success(&result)
                }
                Err(err) => {
                    error!(code = err.code(), error = %err, "tool failed");
                    ToolOutcome::failure(&err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn parse_error(detail: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: format!("Parse error: {}", detail.into()),
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {method}"),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}

pub(crate) fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
