//! Password-grant authentication with session-scoped token caching.
//!
//! The first lookup in a session reads the credential file and POSTs to
//! `oauth2/token`; the token is then cached under [`ACCESS_TOKEN_CACHE_KEY`]
//! and every later call in the same session returns it without I/O. There is
//! no refresh and no retry: an expired token surfaces as an upstream error and
//! the host decides whether to start a new session.

use std::path::Path;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::client::SecretServerClient;
use super::credentials::read_credentials;
use super::error::{Result, SecretServerError};
use super::types::AccessToken;
use crate::lookup::LookupContext;

/// Cache key holding the bearer token for the session.
pub const ACCESS_TOKEN_CACHE_KEY: &str = "access_token";

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Obtains bearer tokens for one Secret Server endpoint.
pub struct Authenticator<'a> {
    client: &'a SecretServerClient,
    auth_file: Option<&'a Path>,
}

impl<'a> Authenticator<'a> {
    pub fn new(client: &'a SecretServerClient, auth_file: Option<&'a Path>) -> Self {
        Self { client, auth_file }
    }

    /// Return the session's token, requesting one if none is cached.
    ///
    /// # Errors
    ///
    /// - [`SecretServerError::MissingAuthFile`] / [`SecretServerError::AuthFile`]
    ///   before any request is made
    /// - [`SecretServerError::TokenRejected`] for a non-200 answer
    /// - [`SecretServerError::MissingAccessToken`] for a 200 without a token
    /// - transport and JSON errors
    pub async fn get_token(&self, context: &dyn LookupContext) -> Result<AccessToken> {
        if let Some(Value::String(token)) = context.cached_value(ACCESS_TOKEN_CACHE_KEY) {
            debug!("Using cached access token");
            return Ok(AccessToken::new(token));
        }

        let auth_file = self.auth_file.ok_or(SecretServerError::MissingAuthFile)?;
        let credentials = read_credentials(context, auth_file)?;

        let url = self.client.token_url()?;
        context.explain(format_args!("Requesting access token from {}", url));

        let identity = credentials.grant_identity();
        let form = [
            ("username", identity.as_str()),
            ("password", credentials.password.expose_secret()),
            ("grant_type", "password"),
        ];

        let response = self.client.http().post(url).form(&form[..]).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = %status, user = %identity, "Token request rejected");
            return Err(SecretServerError::token_rejected(status));
        }

        let body = response.text().await?;
        let token = serde_json::from_str::<TokenResponse>(&body)?
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(SecretServerError::MissingAccessToken)?;

        context.cache(ACCESS_TOKEN_CACHE_KEY, Value::String(token.clone()));
        debug!(user = %identity, "Obtained access token");

        Ok(AccessToken::new(token))
    }
}
