//! # Configuration Management
//!
//! Lookup options as the host hands them over (a string-keyed map), plus the
//! loaders the bundled CLI uses: a YAML file, then `TSS_LOOKUP_*` environment
//! overrides.
//!
//! Recognised keys: `uri` (required), `auth_file`, `use_ssl`, `ca-path`,
//! `ca_file`, `ssl_verify`. Unknown keys are ignored so the same map can carry
//! settings meant for the host.

pub mod tls;

pub use tls::{TlsSettings, VerifyMode};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::{Error, Result};

/// Options for one lookup invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOptions {
    /// Base endpoint of the Secret Server instance, e.g. `https://tss.example.com`.
    #[serde(default)]
    pub uri: Option<String>,

    /// Credential file with `username=`, `password=` and optional `domain=` lines.
    #[serde(default)]
    pub auth_file: Option<PathBuf>,

    /// Force (`true`) or forbid (`false`) TLS regardless of the `uri` scheme.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub use_ssl: Option<bool>,

    /// Directory of PEM CA certificates to trust.
    #[serde(default, rename = "ca-path", alias = "ca_path")]
    pub ca_path: Option<PathBuf>,

    /// PEM CA bundle to trust.
    #[serde(default)]
    pub ca_file: Option<PathBuf>,

    /// Peer certificate verification. Only an explicit `false` disables it.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub ssl_verify: Option<bool>,
}

impl LookupOptions {
    /// Build options from a host-provided map.
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        serde_json::from_value(serde_json::Value::Object(map.clone()))
            .map_err(|e| Error::config_with_source("Invalid lookup options", Box::new(e)))
    }

    /// Parse options from YAML.
    ///
    /// Accepts either a bare options mapping or a hierarchy entry that nests
    /// them under an `options:` key.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(contents)
            .map_err(|e| Error::config_with_source("Invalid options YAML", Box::new(e)))?;

        let options = match document.get("options") {
            Some(nested) => nested.clone(),
            None => document,
        };

        if options.is_null() {
            return Ok(Self::default());
        }

        serde_yaml::from_value(options)
            .map_err(|e| Error::config_with_source("Invalid lookup options", Box::new(e)))
    }

    /// Load options from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config_with_source(
                format!("Failed to read options file: {}", path.display()),
                Box::new(e),
            )
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Apply `TSS_LOOKUP_*` environment variables on top of these options.
    ///
    /// Variables: `TSS_LOOKUP_URI`, `TSS_LOOKUP_AUTH_FILE`, `TSS_LOOKUP_USE_SSL`,
    /// `TSS_LOOKUP_CA_PATH`, `TSS_LOOKUP_CA_FILE`, `TSS_LOOKUP_SSL_VERIFY`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(uri) = env_value("TSS_LOOKUP_URI") {
            self.uri = Some(uri);
        }
        if let Some(path) = env_value("TSS_LOOKUP_AUTH_FILE") {
            self.auth_file = Some(PathBuf::from(path));
        }
        if let Some(path) = env_value("TSS_LOOKUP_CA_PATH") {
            self.ca_path = Some(PathBuf::from(path));
        }
        if let Some(path) = env_value("TSS_LOOKUP_CA_FILE") {
            self.ca_file = Some(PathBuf::from(path));
        }
        if let Some(value) = env_value("TSS_LOOKUP_USE_SSL") {
            self.use_ssl = Some(env_flag("TSS_LOOKUP_USE_SSL", &value)?);
        }
        if let Some(value) = env_value("TSS_LOOKUP_SSL_VERIFY") {
            self.ssl_verify = Some(env_flag("TSS_LOOKUP_SSL_VERIFY", &value)?);
        }
        Ok(self)
    }

    /// Resolve the base endpoint, applying `use_ssl` to its scheme.
    ///
    /// Fails with a configuration error when `uri` is absent or unparseable.
    pub fn base_uri(&self) -> Result<Url> {
        let raw = self
            .uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| Error::config("No URI defined."))?;

        let mut url = Url::parse(raw).map_err(|e| {
            Error::config_with_source(format!("Invalid URI '{}'", raw), Box::new(e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "URI scheme must be http or https, got '{}'",
                url.scheme()
            )));
        }

        match self.use_ssl {
            Some(true) if url.scheme() == "http" => {
                let _ = url.set_scheme("https");
            }
            Some(false) if url.scheme() == "https" => {
                let _ = url.set_scheme("http");
            }
            _ => {}
        }

        Ok(url)
    }

    pub fn tls_settings(&self) -> TlsSettings {
        TlsSettings::from_options(self)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_flag(name: &str, value: &str) -> Result<bool> {
    parse_flag(value)
        .ok_or_else(|| Error::config(format!("Invalid boolean for {}: '{}'", name, value)))
}

/// Interpret the textual booleans accepted in options and environment.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Number(value)) => Ok(Some(value != 0)),
        Some(Flag::Text(text)) => parse_flag(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid boolean value '{}'", text))),
    }
}

// Serialises tests that touch process environment.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
