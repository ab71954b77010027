//! Network transports the gateway sends requests through.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::options::{FilePart, RequestBody};

/// A fully prepared request: absolute URL, final headers, body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query.
    pub url: Url,
    /// Headers after precedence resolution.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<RequestBody>,
}

/// Status and raw body of a received response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// No response was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Performs one network round trip.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send `request` once and return whatever the server answered.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool and no request timeout.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Reuse an existing client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn multipart(file: FilePart, fields: Vec<(String, String)>) -> Result<Form, TransportError> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime {
            part = part
                .mime_str(&mime)
                .map_err(|e| TransportError(format!("invalid mime type {}: {}", mime, e)))?;
        }

        let form = fields
            .into_iter()
            .fold(Form::new().part(file.field, part), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        // Headers first: form and multipart bodies then set their own content type.
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.body(value.to_string()),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            Some(RequestBody::Multipart { file, fields }) => {
                builder.multipart(Self::multipart(file, fields)?)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError(e.to_string()))?
            .to_vec();

        debug!(status = %status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}
