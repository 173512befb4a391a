//! Credential file reader.
//!
//! The file is plain text with one `key = value` per line:
//!
//! ```text
//! username = svc-puppet
//! password = s3cr3t
//! domain   = CORP
//! ```
//!
//! Keys are case-sensitive. Values may not contain whitespace; a line whose
//! value does is ignored, as is any line with an unknown key. The first
//! matching line for a key wins.

use std::path::Path;

use super::error::{Result, SecretServerError};
use super::types::SecretString;
use crate::lookup::LookupContext;

/// Credentials used for the password grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub domain: Option<String>,
}

impl Credentials {
    /// Identity sent as the grant's `username`: `DOMAIN\user` or bare `user`.
    pub fn grant_identity(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}\\{}", domain, self.username),
            None => self.username.clone(),
        }
    }
}

/// Read and parse the credential file through the session's file cache.
pub fn read_credentials(context: &dyn LookupContext, path: &Path) -> Result<Credentials> {
    let contents = context
        .cached_file_data(path)
        .map_err(|e| SecretServerError::auth_file(path, e.to_string()))?;
    parse_credentials(path, &contents)
}

/// Parse credential file contents. `path` is only used in error messages.
pub fn parse_credentials(path: &Path, contents: &str) -> Result<Credentials> {
    let username = field(contents, "username").filter(|v| !v.is_empty());
    let password = field(contents, "password").filter(|v| !v.is_empty());
    let domain = field(contents, "domain").filter(|v| !v.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials {
            username: username.to_string(),
            password: SecretString::new(password),
            domain: domain.map(str::to_string),
        }),
        (None, Some(_)) => Err(unparseable(path, "missing username")),
        (Some(_), None) => Err(unparseable(path, "missing password")),
        (None, None) => Err(unparseable(path, "missing username and password")),
    }
}

fn unparseable(path: &Path, detail: &str) -> SecretServerError {
    SecretServerError::auth_file(path, format!("Couldn't parse auth file: {}", detail))
}

fn field<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    contents.lines().find_map(|line| {
        let (name, value) = line.split_once('=')?;
        if name.trim() != key {
            return None;
        }
        let value = value.trim();
        if value.chars().any(char::is_whitespace) {
            return None;
        }
        Some(value)
    })
}
