//! Lookup key grammar: `secret_server::<digits>`.

use std::fmt;

/// Prefix that routes a key to this backend.
pub const KEY_PREFIX: &str = "secret_server::";

/// Numeric Secret Server secret id taken from a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretId(String);

impl SecretId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// API endpoint for this secret, relative to `api/v1/`.
    pub fn endpoint(&self) -> String {
        format!("secrets/{}", self.0)
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a lookup key relates to this backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMatch {
    /// No `secret_server::` prefix; some other backend owns the key.
    Foreign,
    /// Prefixed, but the suffix is empty or not all ASCII digits.
    Malformed,
    Secret(SecretId),
}

/// Classify `key`. Leading zeros are kept as-is; the id is never reformatted.
pub fn parse_key(key: &str) -> KeyMatch {
    let Some(suffix) = key.strip_prefix(KEY_PREFIX) else {
        return KeyMatch::Foreign;
    };

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return KeyMatch::Malformed;
    }

    KeyMatch::Secret(SecretId(suffix.to_string()))
}
