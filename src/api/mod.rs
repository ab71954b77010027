//! Typed backend resources, one module per endpoint group.
//!
//! Every function is a thin wrapper over [`Gateway::call`](crate::gateway::Gateway::call):
//! it picks the endpoint, builds the request options and names the response type.

pub mod auth;
pub mod chat;
pub mod medications;
pub mod prescriptions;
pub mod upload;

use serde::{Deserialize, Serialize};

/// `{status, message}` acknowledgement several endpoints return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMessage {
    /// `success`, `error`, ...
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
}

impl StatusMessage {
    /// Whether the backend reported success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
