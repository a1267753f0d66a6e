//! Shared primitives for all Rust crates in Rentdesk.

#![forbid(unsafe_code)]

/// Authentication primitives shared across layers.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::SessionIdentity;

/// Result type used across Rentdesk crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or the session expired.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Backend could not be reached or the transport failed.
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-success envelope.
    #[error("api error {code}: {message}")]
    Api {
        /// Envelope code reported by the backend.
        code: i32,
        /// User-visible message reported by the backend.
        message: String,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the message meant for end users, without the category prefix.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Network(message)
            | Self::Internal(message) => message.as_str(),
            Self::Api { message, .. } => message.as_str(),
        }
    }
}
