//! Per-call request configuration.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;

use crate::error::{ClientError, Result};

/// A file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field the file is sent under.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// MIME type; the part is sent without one when absent.
    pub mime: Option<String>,
}

/// Request body variants the backend accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document.
    Json(serde_json::Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
    /// Multipart upload: one file plus plain text fields.
    Multipart {
        /// The file.
        file: FilePart,
        /// Additional text fields.
        fields: Vec<(String, String)>,
    },
}

impl RequestBody {
    /// Whether the transport sets its own content type for this body.
    pub fn sets_own_content_type(&self) -> bool {
        matches!(self, RequestBody::Form(_) | RequestBody::Multipart { .. })
    }
}

/// Method, body, header overlay and query for one call.
///
/// Constructed per call and consumed by [`Gateway::call`](super::Gateway::call).
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method. Defaults to GET.
    pub method: Method,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Header overrides. These win over defaults and the identity header.
    pub headers: HeaderMap,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// GET with no body.
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with no body yet.
    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    /// DELETE with no body.
    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    /// Options with an arbitrary method.
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a URL-encoded form body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Attach a multipart body.
    pub fn multipart(mut self, file: FilePart, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Multipart { file, fields });
        self
    }

    /// Add a header override.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Add a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}
