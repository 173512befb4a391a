//! Error types for Secret Server protocol operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for Secret Server operations.
pub type Result<T> = std::result::Result<T, SecretServerError>;

/// Errors raised while authenticating against or fetching from Secret Server.
///
/// None of the variants carry secret material: credential values and bearer
/// tokens never reach an error message.
#[derive(Error, Debug)]
pub enum SecretServerError {
    /// The credential file could not be read or lacks a required field.
    #[error("Failed auth file parsing: {reason} at {path}")]
    AuthFile { path: PathBuf, reason: String },

    /// A token was needed but no `auth_file` option is configured.
    #[error("Failed auth file parsing: no auth_file configured")]
    MissingAuthFile,

    /// The token endpoint answered with something other than 200.
    #[error("api response did not contain an authentication token: {status} : {reason}")]
    TokenRejected { status: u16, reason: String },

    /// The token endpoint answered 200 but without an `access_token`.
    #[error("api response did not contain an authentication token")]
    MissingAccessToken,

    /// The secret endpoint answered with a status other than 200 or 400.
    #[error("secret server lookup failed. {status} : {reason}")]
    UnexpectedStatus { status: u16, reason: String },

    /// CA material referenced by the options could not be loaded.
    #[error("TLS configuration error: {message}")]
    Tls { message: String },

    /// Request URL could not be built from the base URI.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport failure, including the request timeout.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape we expect.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SecretServerError {
    /// Create an auth file error naming the offending path.
    pub fn auth_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AuthFile { path: path.into(), reason: reason.into() }
    }

    /// Create a token rejection error from an HTTP status.
    pub fn token_rejected(status: reqwest::StatusCode) -> Self {
        Self::TokenRejected { status: status.as_u16(), reason: reason_phrase(status) }
    }

    /// Create an unexpected status error from an HTTP status.
    pub fn unexpected_status(status: reqwest::StatusCode) -> Self {
        Self::UnexpectedStatus { status: status.as_u16(), reason: reason_phrase(status) }
    }

    /// Create a TLS configuration error.
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls { message: message.into() }
    }

    /// HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenRejected { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn reason_phrase(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}
