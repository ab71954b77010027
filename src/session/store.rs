//! Process-wide session: the current identity and its transitions.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::identity::Identity;
use super::storage::IdentityStorage;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::gateway::{Gateway, RequestOptions};
use crate::metrics;

/// Signin request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username or email address.
    pub username_or_email: String,
    /// Plaintext password.
    pub password: String,
}

/// Signup request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Desired username.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Whether anyone is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nobody is signed in.
    #[default]
    Anonymous,
    /// `Identity` is signed in.
    Authenticated(Identity),
}

impl SessionState {
    /// Derived session flag.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// The signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Anonymous => None,
        }
    }
}

/// Holds the single active identity and mirrors it to durable storage.
///
/// Created once at startup and kept for the life of the process. State only
/// changes through [`login`](Self::login), [`signup`](Self::signup) and
/// [`logout`](Self::logout). Overlapping logins are not coordinated: the last
/// response to resolve wins.
#[derive(Debug)]
pub struct SessionStore {
    gateway: Arc<Gateway>,
    storage: Arc<dyn IdentityStorage>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Restore the session from storage.
    ///
    /// A well-formed stored identity starts the session authenticated;
    /// anything else, including a corrupt record, starts it anonymous.
    pub fn new(gateway: Arc<Gateway>, storage: Arc<dyn IdentityStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(identity)) => {
                info!(user_id = %identity.user_id, "restored session");
                SessionState::Authenticated(identity)
            }
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable identity record");
                SessionState::Anonymous
            }
        };

        Self {
            gateway,
            storage,
            state: RwLock::new(state),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The signed-in identity, if any.
    pub fn current(&self) -> Option<Identity> {
        self.state().identity().cloned()
    }

    /// Whether someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// The gateway this session signs in through.
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Sign in. On failure the session is left as it was.
    #[instrument(skip_all, fields(user = %credentials.username_or_email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let identity: Identity = self
            .gateway
            .call(Endpoint::Signin, RequestOptions::post().json(credentials)?)
            .await?;

        self.authenticate(identity.clone())?;
        metrics::record_login();
        info!(user_id = %identity.user_id, "signed in");
        Ok(identity)
    }

    /// Register a new account and sign into it.
    #[instrument(skip_all, fields(user = %registration.username))]
    pub async fn signup(&self, registration: &Registration) -> Result<Identity> {
        let identity: Identity = self
            .gateway
            .call(Endpoint::Signup, RequestOptions::post().json(registration)?)
            .await?;

        self.authenticate(identity.clone())?;
        metrics::record_signup();
        info!(user_id = %identity.user_id, "registered");
        Ok(identity)
    }

    /// Sign out. Always ends anonymous.
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to clear identity record");
        }
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SessionState::Anonymous;
        metrics::record_logout();
        info!("signed out");
    }

    fn authenticate(&self, identity: Identity) -> Result<()> {
        self.storage.save(&identity)?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            SessionState::Authenticated(identity);
        Ok(())
    }
}
