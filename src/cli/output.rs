//! Output formatting for lookup results.
//!
//! Values are redacted unless the caller explicitly asks to reveal them; field
//! names are always shown so a redacted report still tells you what was found.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::lookup::Lookup;
use crate::secrets::{FieldMap, Sensitive};

const REDACTED: &str = "[REDACTED]";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Found,
    NotFound,
}

/// One line of the CLI report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyReport {
    pub key: String,
    pub status: LookupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl KeyReport {
    /// Build a report entry, replacing every value with `[REDACTED]` unless
    /// `reveal` is set.
    pub fn new(key: &str, result: Lookup<Sensitive<FieldMap>>, reveal: bool) -> Self {
        match result {
            Lookup::Found(fields) => {
                let fields = if reveal {
                    fields.into_inner()
                } else {
                    fields
                        .expose_secret()
                        .keys()
                        .map(|name| (name.clone(), REDACTED.to_string()))
                        .collect()
                };
                Self { key: key.to_string(), status: LookupStatus::Found, fields: Some(fields) }
            }
            Lookup::NotFound => {
                Self { key: key.to_string(), status: LookupStatus::NotFound, fields: None }
            }
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == LookupStatus::Found
    }
}

/// Render data in the specified format
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Failed to serialize to YAML"),
    }
}

/// Print data in the specified format
pub fn print_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<()> {
    let rendered = render(data, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}
