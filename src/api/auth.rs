//! Authentication lookups outside the session transitions.

use tracing::instrument;

use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::gateway::{Gateway, RequestOptions};
use crate::session::Identity;

/// Ask the backend who the identity header belongs to.
#[instrument(skip(gateway))]
pub async fn current_user(gateway: &Gateway) -> Result<Identity> {
    gateway.call(Endpoint::CurrentUser, RequestOptions::get()).await
}
