//! Bearer-authenticated secret retrieval with per-path response caching.

use std::path::Path;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::auth::Authenticator;
use super::client::{api_url, request_path, SecretServerClient};
use super::error::{Result, SecretServerError};
use super::record::SecretRecord;
use crate::config::TlsSettings;
use crate::lookup::{Lookup, LookupContext};

/// Fetches secret records from `<base>/SecretServer/api/v1/`.
///
/// A 200 body is cached under its resolved request path for the rest of the
/// session and served from there on later calls, without a token and without
/// a request, even if the upstream value has changed since. A 400 is the
/// server's "no such secret" and maps to [`Lookup::NotFound`]; it is never
/// cached.
pub struct SecretFetcher<'a> {
    base: &'a Url,
    tls: &'a TlsSettings,
    auth_file: Option<&'a Path>,
}

impl<'a> SecretFetcher<'a> {
    pub fn new(base: &'a Url, tls: &'a TlsSettings, auth_file: Option<&'a Path>) -> Self {
        Self { base, tls, auth_file }
    }

    /// Fetch the record at `endpoint` (relative, e.g. `secrets/42`).
    pub async fn fetch_secret(
        &self,
        endpoint: &str,
        context: &dyn LookupContext,
    ) -> Result<Lookup<SecretRecord>> {
        let url = api_url(self.base, &context.interpolate(endpoint))?;
        let path = request_path(&url);

        if let Some(cached) = context.cached_value(&path) {
            context.explain(format_args!("Returning cached value for {}", path));
            debug!(path = %path, "Cache hit for secret response");
            return SecretRecord::from_cached(cached).map(Lookup::Found);
        }

        context.explain(format_args!("Querying {}", url));
        debug!(path = %path, "Cache miss, querying Secret Server");

        let client = SecretServerClient::new(self.base.clone(), self.tls)?;
        let token = Authenticator::new(&client, self.auth_file).get_token(context).await?;

        let response =
            client.http().get(url.clone()).bearer_auth(token.expose_secret()).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let record: SecretRecord = serde_json::from_str(&body)?;
                context.cache(&path, Value::String(body));
                debug!(path = %path, items = record.items.len(), "Fetched secret");
                Ok(Lookup::Found(record))
            }
            StatusCode::BAD_REQUEST => {
                context.explain(format_args!("400 Bad Request for {}", url));
                debug!(path = %path, "Secret Server reported no such secret");
                Ok(Lookup::NotFound)
            }
            status => Err(SecretServerError::unexpected_status(status)),
        }
    }
}
