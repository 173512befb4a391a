//! Secret Server protocol client.
//!
//! Two requests make up the whole protocol:
//!
//! - `POST <base>/SecretServer/oauth2/token` with a form-encoded password
//!   grant, answered by `{"access_token": "..."}`
//! - `GET <base>/SecretServer/api/v1/secrets/<id>` with that token as a bearer
//!   credential, answered by a secret record whose `items` carry the fields
//!
//! Both results are cached in the caller's [`LookupContext`](crate::lookup::LookupContext):
//! the token under [`ACCESS_TOKEN_CACHE_KEY`], each response under its
//! request path. A 400 from the secret endpoint means the id does not exist.
//!
//! # Example
//!
//! ```rust,ignore
//! use tss_lookup::config::TlsSettings;
//! use tss_lookup::lookup::SessionContext;
//! use tss_lookup::secrets::SecretFetcher;
//!
//! let base = url::Url::parse("https://tss.example.com")?;
//! let tls = TlsSettings::default();
//! let ctx = SessionContext::new();
//!
//! let fetcher = SecretFetcher::new(&base, &tls, Some(Path::new("/etc/tss/auth.conf")));
//! if let Some(record) = fetcher.fetch_secret("secrets/42", &ctx).await?.found() {
//!     println!("{} fields", record.credential_fields().len());
//! }
//! ```

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod record;
pub mod types;

pub use auth::{Authenticator, ACCESS_TOKEN_CACHE_KEY};
pub use client::{SecretServerClient, REQUEST_TIMEOUT};
pub use credentials::{parse_credentials, read_credentials, Credentials};
pub use error::{Result, SecretServerError};
pub use fetch::SecretFetcher;
pub use record::{SecretItem, SecretRecord, REDUCED_FIELDS};
pub use types::{AccessToken, FieldMap, SecretString, Sensitive};
