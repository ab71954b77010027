//! Typed client for the MedTrack health-management backend.
//!
//! Every screen of the application talks to the backend through one
//! gateway. The gateway attaches the bypass and JSON headers, adds the
//! signed-in user's id when a session exists, and turns each response into
//! parsed data or a typed failure:
//!
//! ```text
//! screen ──► SessionStore ──┐
//!    │                      ▼
//!    └──────────────────► Gateway ──► Transport ──► backend
//!                           ▲
//!        IdentityStorage ───┘ (read on every call)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`endpoints`]: Endpoint registry
//! - [`gateway`]: Authenticated request gateway and transports
//! - [`session`]: Identity, its storage, and the session store
//! - [`api`]: Typed resources per endpoint group
//! - [`dashboard`]: Concurrent dashboard loader
//! - [`client`]: Application wiring
//! - [`metrics`]: Client-side metrics

pub mod api;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod session;

pub use client::MedTrack;
pub use config::Config;
pub use endpoints::{ApiPath, Endpoint};
pub use error::{ClientError, Result};
pub use gateway::{Gateway, RequestOptions};
pub use session::{Identity, SessionStore};
