//! Gateway module: one authenticated HTTP round trip per call.
//!
//! This module handles:
//! - Per-call request options (method, body, header overrides, query)
//! - Header precedence (defaults, then identity, then overrides)
//! - The transport seam and its reqwest implementation
//! - Mock transport for testing

pub mod client;
pub mod headers;
pub mod mock;
pub mod options;
pub mod transport;

pub use client::Gateway;
pub use headers::HeaderLayers;
pub use mock::{MockReply, MockTransport, MOCK_BASE_URL};
pub use options::{FilePart, RequestBody, RequestOptions};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
