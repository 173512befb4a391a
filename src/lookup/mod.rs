//! # Lookup
//!
//! Entry point a host calls once per key. A key this backend does not own, or
//! a secret id Secret Server does not know, comes back as
//! [`Lookup::NotFound`] so the host can move on to its next source; only
//! configuration and upstream failures are errors.

pub mod context;
pub mod key;

pub use context::{LookupContext, SessionContext};
pub use key::{parse_key, KeyMatch, SecretId, KEY_PREFIX};

use tracing::{debug, Instrument};

use crate::config::LookupOptions;
use crate::errors::Result;
use crate::secrets::{FieldMap, SecretFetcher, Sensitive};

/// Outcome of a lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
        }
    }
}

/// Resolve `key` to the `Username`/`Password` fields of a Secret Server secret.
///
/// The `uri` option is validated first, even for keys another backend owns.
/// Keys shaped `secret_server::<digits>` are fetched; everything else is
/// [`Lookup::NotFound`] without touching the network.
///
/// # Errors
///
/// - [`Error::Config`](crate::errors::Error::Config) when `uri` is missing or invalid
/// - [`Error::Lookup`](crate::errors::Error::Lookup) for any authentication,
///   transport or response failure
pub async fn resolve(
    key: &str,
    options: &LookupOptions,
    context: &dyn LookupContext,
) -> Result<Lookup<Sensitive<FieldMap>>> {
    let base = options.base_uri()?;

    let id = match parse_key(key) {
        KeyMatch::Secret(id) => id,
        KeyMatch::Foreign => return Ok(Lookup::NotFound),
        KeyMatch::Malformed => {
            context.explain(format_args!(
                "Key '{}' has the {} prefix but no numeric secret id",
                key, KEY_PREFIX
            ));
            return Ok(Lookup::NotFound);
        }
    };

    let tls = options.tls_settings();
    let fetcher = SecretFetcher::new(&base, &tls, options.auth_file.as_deref());

    let record = fetcher
        .fetch_secret(&id.endpoint(), context)
        .instrument(crate::lookup_span!(key, secret_id = %id))
        .await?;

    Ok(record.map(|record| {
        let fields = record.credential_fields();
        debug!(secret_id = %id, fields = fields.len(), "Resolved secret");
        Sensitive::new(fields)
    }))
}
