//! HTTP transport abstraction
//!
//! Actions never talk to an HTTP library directly. They build an
//! [`ApiRequest`] and hand it to a [`Transport`], which returns the status and
//! the decoded JSON body. The production implementation is
//! [`http::HttpTransport`]; [`mock::MockTransport`] replays canned replies and
//! records every request for tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

pub mod http;

// Mock transport is available for all builds (not just tests) to support integration tests
pub mod mock;

pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// One request against the API, relative to the transport's base URL
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).json(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach an `Authorization: Bearer` credential
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// Tokens never reach the logs
impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .finish()
    }
}

/// Status and body of an HTTP response
///
/// Empty bodies decode to `Value::Null`; bodies that are not JSON are kept as
/// `Value::String`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-provided error message (`msg`, falling back to `message`)
    pub fn server_message(&self) -> Option<String> {
        match &self.body {
            Value::Object(map) => ["msg", "message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            _ => None,
        }
    }
}

/// Sends API requests
///
/// Implementations only report transport-level failures as errors; any HTTP
/// status, including 4xx and 5xx, is a successful `ApiResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Short identifier for logs
    fn name(&self) -> &str;
}
