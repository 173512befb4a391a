//! Transport security derived from lookup options.
//!
//! # Certificate verification
//!
//! Peer verification is on unless `ssl_verify` is explicitly false. Turning it
//! off accepts any certificate the server presents, including self-signed and
//! mismatched ones, which exposes the bearer token and the fetched credentials
//! to anyone able to intercept the connection. Prefer `ca_file` or `ca-path`
//! for private CAs.

use std::path::{Path, PathBuf};

use reqwest::Certificate;

use super::LookupOptions;
use crate::secrets::SecretServerError;

/// Whether the server certificate is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Require a certificate chaining to a trusted root.
    Peer,
    /// Accept any certificate. Explicit opt-out only.
    None,
}

/// TLS parameters for both the token and secret requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub use_ssl: Option<bool>,
    pub ca_path: Option<PathBuf>,
    pub ca_file: Option<PathBuf>,
    pub verify_mode: VerifyMode,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self { use_ssl: None, ca_path: None, ca_file: None, verify_mode: VerifyMode::Peer }
    }
}

impl TlsSettings {
    pub fn from_options(options: &LookupOptions) -> Self {
        let verify_mode = match options.ssl_verify {
            Some(false) => VerifyMode::None,
            _ => VerifyMode::Peer,
        };

        Self {
            use_ssl: options.use_ssl,
            ca_path: options.ca_path.clone(),
            ca_file: options.ca_file.clone(),
            verify_mode,
        }
    }

    pub fn verifies_peer(&self) -> bool {
        self.verify_mode == VerifyMode::Peer
    }

    /// Load the extra trust roots named by `ca_file` and `ca-path`.
    ///
    /// Every `*.pem`, `*.crt` and `*.cer` file in `ca-path` is loaded, in name
    /// order. A file that yields no certificate is an error.
    pub fn root_certificates(&self) -> Result<Vec<Certificate>, SecretServerError> {
        let mut roots = Vec::new();

        if let Some(file) = &self.ca_file {
            roots.extend(load_bundle(file)?);
        }

        if let Some(dir) = &self.ca_path {
            let entries = std::fs::read_dir(dir).map_err(|e| {
                SecretServerError::tls(format!("cannot read CA directory {}: {}", dir.display(), e))
            })?;

            let mut files: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_certificate_file(path))
                .collect();
            files.sort();

            for file in files {
                roots.extend(load_bundle(&file)?);
            }
        }

        Ok(roots)
    }
}

fn is_certificate_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "pem" | "crt" | "cer"))
        .unwrap_or(false)
}

fn load_bundle(path: &Path) -> Result<Vec<Certificate>, SecretServerError> {
    let pem = std::fs::read(path).map_err(|e| {
        SecretServerError::tls(format!("cannot read CA file {}: {}", path.display(), e))
    })?;

    let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
        SecretServerError::tls(format!("invalid PEM in {}: {}", path.display(), e))
    })?;

    if certs.is_empty() {
        return Err(SecretServerError::tls(format!(
            "{} does not contain any certificates",
            path.display()
        )));
    }

    Ok(certs)
}
