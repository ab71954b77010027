//! The authenticated request gateway.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::headers::HeaderLayers;
use super::options::{RequestBody, RequestOptions};
use super::transport::{HttpRequest, Transport};
use crate::config::Config;
use crate::endpoints::ApiPath;
use crate::error::{ClientError, Result};
use crate::metrics;
use crate::session::{Identity, IdentityStorage};

/// Performs one authenticated round trip per call and normalizes the outcome.
///
/// Every call reads the identity from storage afresh; there is no caching,
/// no retry and no timeout.
#[derive(Debug, Clone)]
pub struct Gateway {
    /// Base address every path is composed with.
    base_url: Url,
    /// Fixed diagnostic bypass header.
    bypass_header: HeaderName,
    bypass_value: HeaderValue,
    /// Header carrying the signed-in user's id.
    identity_header: HeaderName,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn IdentityStorage>,
}

impl Gateway {
    /// Create a gateway from validated config.
    pub fn new(
        config: &Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn IdentityStorage>,
    ) -> Result<Self> {
        config.validate().map_err(ClientError::InvalidConfig)?;

        let bypass_header = HeaderName::from_bytes(config.medtrack_bypass_header.as_bytes())
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
        let bypass_value = HeaderValue::from_str(&config.medtrack_bypass_value)
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
        let identity_header = HeaderName::from_bytes(config.medtrack_identity_header.as_bytes())
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url()?,
            bypass_header,
            bypass_value,
            identity_header,
            transport,
            storage,
        })
    }

    /// Base address of the backend.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Storage the identity is read from.
    pub fn storage(&self) -> &Arc<dyn IdentityStorage> {
        &self.storage
    }

    /// Call `path` and deserialize the JSON success body into `T`.
    ///
    /// ## Errors
    ///
    /// - `ClientError::Network` if no response arrived
    /// - `ClientError::Request` on a non-2xx status, carrying the body's
    ///   `detail` or `message` text, or a generic message
    /// - `ClientError::Parse` if a 2xx body is not valid JSON for `T`
    ///
    /// Every failure is logged once before it is returned.
    pub async fn call<T>(&self, path: impl Into<ApiPath>, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = path.into();
        let method = options.method.clone();
        let start = Instant::now();

        let outcome = match self.round_trip(&path, options).await {
            Ok(body) => decode(&body),
            Err(e) => Err(e),
        };

        metrics::record_gateway_call(start, outcome.as_ref().err().map(ClientError::kind));

        if let Err(e) = &outcome {
            error!(path = %path, method = %method, error = %e, "request failed");
        }

        outcome
    }

    /// Call `path` and return the raw JSON body.
    pub async fn call_value(
        &self,
        path: impl Into<ApiPath>,
        options: RequestOptions,
    ) -> Result<Value> {
        self.call(path, options).await
    }

    /// Build the outgoing request without sending it.
    pub fn prepare(&self, path: &ApiPath, options: RequestOptions) -> Result<HttpRequest> {
        let mut url = path.to_url(&self.base_url)?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query.iter());
        }

        let mut defaults = HeaderMap::new();
        defaults.insert(self.bypass_header.clone(), self.bypass_value.clone());
        let own_content_type = options
            .body
            .as_ref()
            .is_some_and(RequestBody::sets_own_content_type);
        if !own_content_type {
            defaults.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut identity = HeaderMap::new();
        if let Some(current) = self.stored_identity() {
            let value = HeaderValue::from_str(&current.user_id)
                .map_err(|e| ClientError::InvalidHeader(format!("user id: {}", e)))?;
            identity.insert(self.identity_header.clone(), value);
        }

        let headers = HeaderLayers {
            defaults,
            identity,
            overrides: options.headers,
        }
        .resolve();

        Ok(HttpRequest {
            method: options.method,
            url,
            headers,
            body: options.body,
        })
    }

    #[instrument(skip_all, fields(path = %path, method = %options.method))]
    async fn round_trip(&self, path: &ApiPath, options: RequestOptions) -> Result<Vec<u8>> {
        let request = self.prepare(path, options)?;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ClientError::Network(e.0))?;

        debug!(status = %response.status, "response received");

        if response.status.is_success() {
            Ok(response.body)
        } else {
            Err(ClientError::Request {
                status: response.status.as_u16(),
                message: failure_message(response.status, &response.body),
            })
        }
    }

    fn stored_identity(&self) -> Option<Identity> {
        match self.storage.load() {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable identity record");
                None
            }
        }
    }
}

/// Deserialize a success body. An empty body reads as JSON `null`.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    parsed.map_err(|e| ClientError::Parse(e.to_string()))
}

/// The server's `detail` or `message` text, else a generic message.
fn failure_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_owned))
        })
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}
