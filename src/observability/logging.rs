//! # Structured Logging
//!
//! Span macro and subscriber setup for lookups.
//!
//! Nothing logged by this crate carries a credential value or a bearer token;
//! those only ever travel in [`Sensitive`](crate::secrets::Sensitive),
//! [`SecretString`](crate::secrets::SecretString) and
//! [`AccessToken`](crate::secrets::AccessToken), which all render as
//! `[REDACTED]`.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Create a tracing span for one key lookup.
///
/// ```rust,ignore
/// let span = lookup_span!("secret_server::42");
/// let span = lookup_span!(key, secret_id = %id);
/// ```
#[macro_export]
macro_rules! lookup_span {
    ($key:expr) => {
        tracing::info_span!(
            "secret_lookup",
            key = %$key,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($key:expr, $($field:tt)*) => {
        tracing::info_span!(
            "secret_lookup",
            key = %$key,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Subscriber settings for the bundled CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), json: false }
    }
}

impl LoggingConfig {
    /// Read `TSS_LOOKUP_LOG_LEVEL` and `TSS_LOOKUP_LOG_JSON` over the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("TSS_LOOKUP_LOG_LEVEL") {
            if !level.trim().is_empty() {
                config.level = level.trim().to_string();
            }
        }

        if let Ok(json) = std::env::var("TSS_LOOKUP_LOG_JSON") {
            config.json = crate::config::parse_flag(&json).unwrap_or(false);
        }

        config
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins over `config.level`. If a subscriber is already installed
/// (a host application, or another test) the call is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder =
        FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
}
