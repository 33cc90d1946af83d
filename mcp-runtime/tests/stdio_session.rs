//! Drives a full stdio session against an in-memory API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use singularity_core::time::LocalZone;
use singularity_mcp_runtime::client::SingularityClient;
use singularity_mcp_runtime::error::ClientError;
use singularity_mcp_runtime::framing::{Inbound, read_message};
use singularity_mcp_runtime::server::McpServer;
use singularity_mcp_runtime::transport::{ApiRequest, Transport};
use tokio::io::AsyncReadExt;

/// Minimal stand-in for the remote API: one task whose tags can change.
struct InMemoryApi {
    tags: Mutex<Vec<String>>,
    log: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for InMemoryApi {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ClientError> {
        let path = request.path();
        self.log
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method, path));
        match (request.method.as_str(), path.as_str()) {
            ("GET", "/task") => Ok(Some(json!({"tasks": [
                {"id": "T-1", "title": "Inbox task"},
                {"id": "T-2", "title": "Project task", "projectId": "P-1"}
            ]}))),
            ("GET", "/task/T-1") => Ok(Some(self.task())),
            ("PATCH", "/task/T-1") => {
                let body = request.body.unwrap_or_default();
                if let Some(tags) = body.get("tags").and_then(Value::as_array) {
                    *self.tags.lock().unwrap() = tags
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                }
                Ok(Some(self.task()))
            }
            ("DELETE", "/task/T-1") => Ok(None),
            _ => Err(ClientError::Remote {
                status: 404,
                message: "Not found".to_string(),
            }),
        }
    }
}

impl InMemoryApi {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            tags: Mutex::new(vec!["G-1".to_string()]),
            log: Mutex::new(Vec::new()),
        })
    }

    fn task(&self) -> Value {
        json!({"id": "T-1", "title": "Inbox task", "tags": *self.tags.lock().unwrap()})
    }
}

fn call(id: u64, name: &str, arguments: Value) -> String {
    let message = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    });
    format!("{message}\n")
}

async fn run_session(api: Arc<InMemoryApi>, input: String) -> Vec<Value> {
    let zone = LocalZone::from_offset_hours(0).unwrap();
    let server = Arc::new(McpServer::new(SingularityClient::new(api, zone)));
    let (writer, mut output) = tokio::io::duplex(1 << 20);
    server.serve(input.as_bytes(), writer).await.unwrap();

    let mut bytes = Vec::new();
    output.read_to_end(&mut bytes).await.unwrap();
    let mut reader = &bytes[..];
    let mut responses = Vec::new();
    while let Some(frame) = read_message(&mut reader).await.unwrap() {
        match frame.payload {
            Inbound::Message(message) => responses.push(message),
            Inbound::Malformed(reason) => panic!("server wrote invalid JSON: {reason}"),
        }
    }
    responses.sort_by_key(|response| response["id"].as_u64().unwrap_or(0));
    responses
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn session_lists_calls_and_reports_errors() {
    let api = InMemoryApi::new();
    let mut input = String::new();
    input.push_str(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{\"protocolVersion\":\"2025-03-26\"}}\n",
    );
    input.push_str("{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n");
    input.push_str("{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n");
    input.push_str(&call(3, "list_inbox_tasks", json!({})));
    input.push_str(&call(4, "delete_task", json!({"task_id": "T-1"})));
    input.push_str(&call(5, "get_project", json!({"project_id": "P-404"})));
    input.push_str(&call(6, "create_task", json!({})));

    let responses = run_session(api.clone(), input).await;
    assert_eq!(responses.len(), 6);

    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 26);

    let inbox: Value = serde_json::from_str(text(&responses[2])).unwrap();
    assert_eq!(inbox, json!([{"id": "T-1", "title": "Inbox task"}]));

    let deleted: Value = serde_json::from_str(text(&responses[3])).unwrap();
    assert_eq!(deleted, json!({"status": "deleted", "task_id": "T-1"}));

    assert_eq!(responses[4]["result"]["isError"], true);
    assert_eq!(
        text(&responses[4]),
        "Error: Singularity API returned 404: Not found"
    );

    assert_eq!(responses[5]["result"]["isError"], true);
    assert_eq!(text(&responses[5]), "Error: Missing required argument 'title'");
}

#[tokio::test]
async fn tag_edits_read_then_write_the_full_set() {
    let api = InMemoryApi::new();
    let input = call(1, "add_task_tag", json!({"task_id": "T-1", "tag_id": "G-2"}));
    let responses = run_session(api.clone(), input).await;
    let task: Value = serde_json::from_str(text(&responses[0])).unwrap();
    assert_eq!(task["tags"], json!(["G-1", "G-2"]));

    let input = call(1, "remove_task_tag", json!({"task_id": "T-1", "tag_id": "G-9"}));
    run_session(api.clone(), input).await;

    let log = api.log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec!["GET /task/T-1", "PATCH /task/T-1", "GET /task/T-1"]
    );
}
