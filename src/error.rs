use thiserror::Error;

use crate::content::ContentKind;

/// Failures surfaced by the content repository and everything built on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{kind} {id} not found")]
    NotFound { kind: ContentKind, id: i64 },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("unauthorized")]
    Unauthorized,
}

impl ContentError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ContentError::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn store(err: anyhow::Error) -> Self {
        ContentError::StoreUnavailable(format!("{err:#}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("session flag unavailable: {0}")]
    Persistence(String),
}
