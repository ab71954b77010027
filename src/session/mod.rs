//! Session module: the signed-in identity and where it is persisted.
//!
//! This module handles:
//! - The identity record returned by signup/signin
//! - Durable storage of that record (file-backed and in-memory)
//! - The session store with its login/signup/logout transitions

pub mod identity;
pub mod storage;
pub mod store;

pub use identity::Identity;
pub use storage::{FileStorage, IdentityStorage, MemoryStorage};
pub use store::{Credentials, Registration, SessionState, SessionStore};
