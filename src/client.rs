//! Application wiring: one gateway and one session sharing one storage.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::{Gateway, ReqwestTransport, Transport};
use crate::session::{FileStorage, IdentityStorage, SessionStore};

/// The client's long-lived parts, created once at startup.
#[derive(Debug)]
pub struct MedTrack {
    gateway: Arc<Gateway>,
    session: SessionStore,
}

impl MedTrack {
    /// Production wiring: reqwest transport and file-backed identity storage.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = FileStorage::new(config.session_dir(), &config.medtrack_storage_key);
        debug!(path = %storage.path().display(), "using identity record");
        Self::with_parts(config, Arc::new(ReqwestTransport::new()), Arc::new(storage))
    }

    /// Wire arbitrary transport and storage, e.g. test doubles.
    pub fn with_parts(
        config: &Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn IdentityStorage>,
    ) -> Result<Self> {
        let gateway = Arc::new(Gateway::new(config, transport, storage.clone())?);
        let session = SessionStore::new(gateway.clone(), storage);
        Ok(Self { gateway, session })
    }

    /// The request gateway.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}
