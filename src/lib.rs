//! # tss-lookup
//!
//! Lookup backend that resolves `secret_server::<id>` keys to the
//! `Username`/`Password` fields of a Delinea (Thycotic) Secret Server secret.
//!
//! ## Flow
//!
//! ```text
//! key ─→ resolve ─→ SecretFetcher ─→ GET api/v1/secrets/<id>
//!                        │
//!                        └─→ Authenticator ─→ POST oauth2/token
//!                                  │
//!                                  └─→ credential file
//! ```
//!
//! The host supplies a [`LookupContext`](lookup::LookupContext) that owns the
//! session cache; the access token and every successful response live there
//! until the host drops it.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tss_lookup::{resolve, Lookup, LookupOptions, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> tss_lookup::Result<()> {
//!     let options = LookupOptions {
//!         uri: Some("https://tss.example.com".to_string()),
//!         auth_file: Some("/etc/tss/auth.conf".into()),
//!         ..Default::default()
//!     };
//!     let session = SessionContext::new();
//!
//!     if let Lookup::Found(fields) = resolve("secret_server::42", &options, &session).await? {
//!         let username = fields.expose_secret().get("Username");
//!         println!("found user {:?}", username.is_some());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::{LookupOptions, TlsSettings, VerifyMode};
pub use errors::{Error, Result};
pub use lookup::{resolve, Lookup, LookupContext, SessionContext};
pub use secrets::{FieldMap, SecretServerError, Sensitive};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
