//! The HTTP primitive the client is built on: method + path + query + body
//! over HTTPS with bearer auth and a fixed timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

const REMOTE_MESSAGE_MAX_CHARS: usize = 500;

/// One outbound API call. The path is kept as segments relative to the API
/// base; each segment is percent-encoded on its own, so an id containing `/`
/// stays one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|segment| segment.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post(segments: &[&str], body: Value) -> Self {
        Self::new(Method::POST, segments).with_body(body)
    }

    pub fn patch(segments: &[&str], body: Value) -> Self {
        Self::new(Method::PATCH, segments).with_body(body)
    }

    pub fn delete(segments: &[&str]) -> Self {
        Self::new(Method::DELETE, segments)
    }

    /// Unencoded `/`-joined path, for logs and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes API requests. `Ok(None)` means the remote answered 204 No Content.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ClientError>;
}

/// `reqwest`-backed transport for the real API.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| {
            ClientError::Configuration(format!("Invalid API URL '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "Invalid API URL '{base_url}': must be an http(s) URL"
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            token,
            timeout,
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(&request.segments);
        }
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ClientError> {
        let url = self.url_for(&request);
        tracing::debug!(
            method = %request.method,
            path = %request.path(),
            query = ?request.query,
            has_body = request.body.is_some(),
            "sending API request"
        );

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "API response received");

        if !status.is_success() {
            return Err(ClientError::Remote {
                status: status.as_u16(),
                message: remote_message(status, &bytes),
            });
        }
        parse_success_body(status, &bytes).map(Some)
    }
}

fn parse_success_body(status: StatusCode, bytes: &[u8]) -> Result<Value, ClientError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ClientError::Decode(format!(
            "empty body with status {}",
            status.as_u16()
        )));
    }
    serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(format!("invalid JSON: {e}")))
}

/// Best human-readable message from an error response body.
fn remote_message(status: StatusCode, bytes: &[u8]) -> String {
    if let Ok(body) = serde_json::from_slice::<Value>(bytes) {
        for key in ["message", "error", "detail"] {
            if let Some(text) = body.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }
    let mut message: String = text.chars().take(REMOTE_MESSAGE_MAX_CHARS).collect();
    if text.chars().count() > REMOTE_MESSAGE_MAX_CHARS {
        message.push('…');
    }
    message.replace(['\r', '\n'], " ")
}
