//! Secret record as returned by `GET /api/v1/secrets/{id}`.

use serde::Deserialize;
use serde_json::Value;

use super::error::Result;
use super::types::{FieldMap, SecretString};

/// Item fields kept when a record is reduced for the caller.
pub const REDUCED_FIELDS: [&str; 2] = ["Username", "Password"];

/// Parsed secret. Only `items` is required; other upstream fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub items: Vec<SecretItem>,
}

/// One field of a secret template. The value stays redacted in `Debug`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretItem {
    pub field_name: String,
    #[serde(default)]
    pub item_value: Option<SecretString>,
}

impl SecretRecord {
    /// Parse a record from a cached entry: either the raw response body
    /// (as stored by the fetcher) or an already-parsed JSON object.
    pub fn from_cached(value: Value) -> Result<Self> {
        match value {
            Value::String(body) => Ok(serde_json::from_str(&body)?),
            other => Ok(serde_json::from_value(other)?),
        }
    }

    /// Keep only `Username` and `Password`. Later duplicates overwrite earlier
    /// ones; items without a value are skipped. An empty map is valid.
    pub fn credential_fields(&self) -> FieldMap {
        self.items
            .iter()
            .filter(|item| REDUCED_FIELDS.contains(&item.field_name.as_str()))
            .filter_map(|item| {
                item.item_value
                    .as_ref()
                    .map(|value| (item.field_name.clone(), value.expose_secret().to_string()))
            })
            .collect()
    }
}
