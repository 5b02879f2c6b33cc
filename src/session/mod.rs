//! Admin session guard.
//!
//! The guard decides whether write-capable admin controls are offered. It
//! checks the submitted pair against the configured admin identity and keeps
//! a logged-in flag in a [`SessionFlagStore`]. The flag has no expiry.

pub mod flag;

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

pub use flag::{FileFlag, MemoryFlag, SessionFlagStore};

use crate::error::SessionError;

type Digest32 = [u8; 32];

fn digest(value: &str) -> Digest32 {
    Sha256::digest(value.as_bytes()).into()
}

fn same_digest(a: &Digest32, b: &Digest32) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// The single admin identity. Only digests are kept in memory.
#[derive(Clone)]
pub struct Credentials {
    username: Digest32,
    password: Option<Digest32>,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: digest(username),
            password: Some(digest(password)),
        }
    }

    /// Credentials that reject every login.
    pub fn disabled() -> Self {
        Self {
            username: digest(""),
            password: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(expected) = &self.password else {
            return false;
        };
        let user_ok = same_digest(&self.username, &digest(username));
        let pass_ok = same_digest(expected, &digest(password));
        user_ok & pass_ok
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

#[derive(Clone)]
pub struct SessionGuard {
    credentials: Credentials,
    flag: Arc<dyn SessionFlagStore>,
}

impl SessionGuard {
    pub fn new(credentials: Credentials, flag: Arc<dyn SessionFlagStore>) -> Self {
        Self { credentials, flag }
    }

    pub fn attempt_login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        if !self.credentials.verify(username, password) {
            log::warn!("🔒 admin login rejected");
            return Err(SessionError::InvalidCredentials);
        }
        self.flag
            .store(true)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;
        log::info!("🔓 admin logged in");
        Ok(())
    }

    /// Reads the persisted flag on every call, so an external clear is seen
    /// immediately.
    pub fn is_authenticated(&self) -> bool {
        match self.flag.load() {
            Ok(logged_in) => logged_in,
            Err(e) => {
                log::warn!("reading session flag failed: {}", e);
                false
            }
        }
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.flag
            .store(false)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;
        log::info!("🔒 admin logged out");
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }
}
