//! # Error Handling
//!
//! Crate-boundary errors for the Secret Server lookup backend.
//!
//! "This key is not ours" is not an error: it travels as
//! [`Lookup::NotFound`](crate::lookup::Lookup::NotFound) on the success path.
//! What remains here are the two ways a lookup can abort.

use crate::secrets::SecretServerError;

/// Custom result type for lookup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the lookup backend
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Required option missing or unusable. Raised before any network activity.
    #[error("Cannot use Secret Server backend: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication or fetch failed. Carries the underlying cause.
    #[error("Secret server lookup failed: {0}")]
    Lookup(#[from] SecretServerError),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// HTTP status code behind a lookup failure, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Lookup(err) => err.status(),
            Self::Config { .. } => None,
        }
    }
}
