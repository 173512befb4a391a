//! HTTP plumbing shared by the token and secret requests.

use std::time::Duration;

use tracing::warn;
use url::Url;

use super::error::Result;
use crate::config::TlsSettings;

/// Overall timeout applied to every request; there is no separate connect timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const TOKEN_PATH: &str = "/SecretServer/oauth2/token";
const API_PREFIX: &str = "/SecretServer/api/v1/";

/// Secret Server endpoint plus an HTTP client configured from [`TlsSettings`].
#[derive(Debug, Clone)]
pub struct SecretServerClient {
    http: reqwest::Client,
    base: Url,
}

impl SecretServerClient {
    /// Build a client for `base`. Loads any CA material named by `tls`.
    pub fn new(base: Url, tls: &TlsSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        for cert in tls.root_certificates()? {
            builder = builder.add_root_certificate(cert);
        }

        if !tls.verifies_peer() {
            warn!(
                base = %base,
                "TLS certificate verification is DISABLED (ssl_verify=false); \
                 credentials are exposed to interception"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self { http: builder.build()?, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `<base>/SecretServer/oauth2/token`
    pub fn token_url(&self) -> Result<Url> {
        Ok(self.base.join(TOKEN_PATH)?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Join `endpoint` under `<base>/SecretServer/api/v1/`, percent-escaping it.
pub fn api_url(base: &Url, endpoint: &str) -> Result<Url> {
    Ok(base.join(API_PREFIX)?.join(endpoint.trim_start_matches('/'))?)
}

/// Request path (and query) of `url`; the cache key for secret responses.
pub fn request_path(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
