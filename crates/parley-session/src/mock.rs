//! Scripted in-memory transport for tests.
//!
//! Every request is recorded. Each `send` yields to the scheduler before
//! answering, so concurrent callers genuinely interleave, and individual
//! paths can be given a delay (use a paused tokio clock to keep tests
//! fast).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::manager::lock;
use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
    delays: HashMap<String, Duration>,
}

impl MockTransport {
    /// `handler` computes the reply for each request at the moment the
    /// reply is delivered (after any delay).
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delays: HashMap::new(),
        }
    }

    /// Delay every reply for `path`.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// Every request sent so far, in send order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Requests sent to `path`.
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        tokio::task::yield_now().await;
        if let Some(delay) = self.delays.get(&request.path) {
            tokio::time::sleep(*delay).await;
        }
        (self.handler)(request)
    }
}
