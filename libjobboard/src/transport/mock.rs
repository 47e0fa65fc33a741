//! Mock transport implementation for testing
//!
//! Replays canned replies per `(method, path)` and records every request it
//! receives, so tests can check both what the store ended up with and which
//! calls were (or were not) made.
//!
//! Replies queued on the same route are consumed in order; the last one keeps
//! answering once the queue is down to a single reply. Unrouted requests get a
//! 404 with a `msg` body.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::sleep;

use super::{ApiRequest, ApiResponse, HttpMethod, Transport};
use crate::error::TransportError;

#[derive(Debug, Clone)]
enum Outcome {
    Json { status: u16, body: Value },
    NetworkError(String),
}

/// A canned answer
#[derive(Debug, Clone)]
pub struct MockReply {
    outcome: Outcome,
    delay: Duration,
}

impl MockReply {
    /// Reply with any status and JSON body
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            outcome: Outcome::Json { status, body },
            delay: Duration::ZERO,
        }
    }

    /// 200 with a JSON body
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// Non-2xx with `{"msg": message}`
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "msg": message }))
    }

    /// Fail before any HTTP response (connection refused, DNS, ...)
    pub fn network_error(message: &str) -> Self {
        Self {
            outcome: Outcome::NetworkError(message.to_string()),
            delay: Duration::ZERO,
        }
    }

    /// Simulate latency before the reply is delivered
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Routes = HashMap<(HttpMethod, String), VecDeque<MockReply>>;

/// Mock transport for testing
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Routes>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style route registration
    pub fn with_reply(self, method: HttpMethod, path: &str, reply: MockReply) -> Self {
        self.push_reply(method, path, reply);
        self
    }

    /// Queue a reply for `(method, path)`
    pub fn push_reply(&self, method: HttpMethod, path: &str, reply: MockReply) {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests sent to `path`
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    fn next_reply(&self, method: HttpMethod, path: &str) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let reply = self.next_reply(request.method, &request.path);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let Some(reply) = reply else {
            return Ok(ApiResponse {
                status: 404,
                body: json!({ "msg": "Not found" }),
            });
        };

        if !reply.delay.is_zero() {
            sleep(reply.delay).await;
        }

        match reply.outcome {
            Outcome::Json { status, body } => Ok(ApiResponse { status, body }),
            Outcome::NetworkError(message) => Err(TransportError::Network(message)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_route() {
        let transport = MockTransport::new().with_reply(
            HttpMethod::Get,
            "/api/hello",
            MockReply::ok(json!({"message": "hola"})),
        );

        let response = transport.send(ApiRequest::get("/api/hello")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"], "hola");
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_queue_then_repeat_last() {
        let transport = MockTransport::new()
            .with_reply(HttpMethod::Get, "/api/ofertas", MockReply::ok(json!({"n": 1})))
            .with_reply(HttpMethod::Get, "/api/ofertas", MockReply::ok(json!({"n": 2})));

        let first = transport.send(ApiRequest::get("/api/ofertas")).await.unwrap();
        let second = transport.send(ApiRequest::get("/api/ofertas")).await.unwrap();
        let third = transport.send(ApiRequest::get("/api/ofertas")).await.unwrap();

        assert_eq!(first.body["n"], 1);
        assert_eq!(second.body["n"], 2);
        assert_eq!(third.body["n"], 2);
    }

    #[tokio::test]
    async fn test_mock_unrouted_is_404() {
        let transport = MockTransport::new();
        let response = transport.send(ApiRequest::get("/nope")).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(transport.requests_to("/nope").len(), 1);
    }

    #[tokio::test]
    async fn test_mock_network_error() {
        let transport = MockTransport::new().with_reply(
            HttpMethod::Post,
            "/api/login",
            MockReply::network_error("connection refused"),
        );
        let result = transport
            .send(ApiRequest::post("/api/login", json!({})))
            .await;
        assert_eq!(
            result,
            Err(TransportError::Network("connection refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_mock_method_is_part_of_route() {
        let transport = MockTransport::new().with_reply(
            HttpMethod::Delete,
            "/api/postulados/3",
            MockReply::ok(json!({})),
        );
        let response = transport
            .send(ApiRequest::get("/api/postulados/3"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_mock_with_delay() {
        let transport = MockTransport::new().with_reply(
            HttpMethod::Get,
            "/api/hello",
            MockReply::ok(json!({})).after(Duration::from_millis(30)),
        );

        let start = std::time::Instant::now();
        transport.send(ApiRequest::get("/api/hello")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_clones_share_request_log() {
        let transport = MockTransport::new();
        let clone = transport.clone();
        clone.send(ApiRequest::get("/api/hello")).await.unwrap();
        assert_eq!(transport.request_count(), 1);
    }
}
