//! Mock transport for unit testing.
//!
//! Replies are scripted per method and path, and every request is recorded
//! so tests can inspect exactly what went on the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::client::Gateway;
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::config::Config;
use crate::error;
use crate::session::IdentityStorage;

/// Base address of gateways built by [`MockTransport::gateway`].
pub const MOCK_BASE_URL: &str = "http://mock.test";

/// Scripted outcome for one route.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this status and raw body.
    Respond {
        /// Status code.
        status: StatusCode,
        /// Raw body.
        body: Vec<u8>,
    },
    /// Fail before any response, as a refused connection would.
    NetworkError(String),
}

impl MockReply {
    /// Reply with a JSON body.
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockReply::Respond {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_string().into_bytes(),
        }
    }

    /// Reply with a plain text body.
    pub fn text(status: u16, body: &str) -> Self {
        MockReply::Respond {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.as_bytes().to_vec(),
        }
    }

    /// Fail at the transport level.
    pub fn network_error(message: impl Into<String>) -> Self {
        MockReply::NetworkError(message.into())
    }
}

/// Mock transport for testing.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Scripted replies keyed by method and URL path.
    routes: Arc<Mutex<HashMap<(Method, String), MockReply>>>,
    /// Every request sent, in order.
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Create a mock that answers 404 to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for `method` on `path` (URL path, no query).
    pub fn on(&self, method: Method, path: impl Into<String>, reply: MockReply) -> &Self {
        lock(&self.routes).insert((method, path.into()), reply);
        self
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// A gateway that sends through this mock and reads identity from `storage`.
    pub fn gateway(&self, storage: Arc<dyn IdentityStorage>) -> error::Result<Gateway> {
        Gateway::new(
            &Config::with_api_url(MOCK_BASE_URL),
            Arc::new(self.clone()),
            storage,
        )
    }

    /// Clear scripted routes and recorded requests.
    pub fn clear(&self) {
        lock(&self.routes).clear();
        lock(&self.requests).clear();
    }
}

// A panic inside a test must not poison every later assertion.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method.clone(), request.url.path().to_string());
        lock(&self.requests).push(request);

        let reply = lock(&self.routes)
            .get(&key)
            .cloned()
            .unwrap_or_else(|| MockReply::json(404, serde_json::json!({"detail": "Not Found"})));

        match reply {
            MockReply::Respond { status, body } => Ok(HttpResponse { status, body }),
            MockReply::NetworkError(message) => Err(TransportError(message)),
        }
    }
}
