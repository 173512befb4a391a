//! Host capabilities consumed by the lookup core.
//!
//! The session cache, file reading, interpolation and diagnostics all belong
//! to the host that invokes [`resolve`](super::resolve). They are passed in
//! as a [`LookupContext`] on every call rather than held in globals, so the
//! lifetime of a cached token or response is exactly the lifetime of the
//! context the host chooses to reuse.

use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Capabilities a host provides to a lookup.
///
/// Implementations must be internally synchronised: lookups for different
/// keys may share one context from several tasks. The core only performs
/// read-then-conditionally-write sequences and holds no lock across I/O.
pub trait LookupContext: Send + Sync {
    /// Return the cached value for `key`, if any.
    fn cached_value(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key` for the rest of the session.
    fn cache(&self, key: &str, value: Value);

    fn cache_has_key(&self, key: &str) -> bool {
        self.cached_value(key).is_some()
    }

    /// Expand host variables in `input`. The default is the identity.
    fn interpolate(&self, input: &str) -> String {
        input.to_string()
    }

    /// Contents of the file at `path`, read at most once per session.
    fn cached_file_data(&self, path: &Path) -> io::Result<Arc<str>>;

    /// Diagnostic sink. Arguments are only formatted if the sink is active.
    fn explain(&self, message: fmt::Arguments<'_>) {
        debug!(explain = %message, "lookup explain");
    }
}

/// In-memory [`LookupContext`] for one lookup session.
///
/// Backed by `DashMap` so it can be shared between concurrent lookups.
/// Interpolation expands `%{name}` (and hiera-style `%{::name}`) from a
/// fixed scope; unknown names expand to the empty string.
#[derive(Default)]
pub struct SessionContext {
    cache: DashMap<String, Value>,
    files: DashMap<PathBuf, Arc<str>>,
    scope: HashMap<String, String>,
    explain_log: Option<Mutex<Vec<String>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the variables available to `%{...}` interpolation.
    pub fn with_scope(mut self, scope: HashMap<String, String>) -> Self {
        self.scope = scope;
        self
    }

    /// Record every `explain` message so the host can show it afterwards.
    pub fn with_explain(mut self) -> Self {
        self.explain_log = Some(Mutex::new(Vec::new()));
        self
    }

    /// Messages collected so far (empty unless [`with_explain`](Self::with_explain) was used).
    pub fn explanations(&self) -> Vec<String> {
        self.explain_log
            .as_ref()
            .map(|log| log.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .unwrap_or_default()
    }

    /// Number of cached entries (tokens and responses).
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for SessionContext {
    // Cached values include the bearer token; only report sizes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("cached_entries", &self.cache.len())
            .field("cached_files", &self.files.len())
            .field("scope_vars", &self.scope.len())
            .field("explain", &self.explain_log.is_some())
            .finish()
    }
}

impl LookupContext for SessionContext {
    fn cached_value(&self, key: &str) -> Option<Value> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    fn cache(&self, key: &str, value: Value) {
        self.cache.insert(key.to_string(), value);
    }

    fn cache_has_key(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    fn interpolate(&self, input: &str) -> String {
        interpolate_scope(input, &self.scope)
    }

    fn cached_file_data(&self, path: &Path) -> io::Result<Arc<str>> {
        if let Some(contents) = self.files.get(path).map(|entry| Arc::clone(entry.value())) {
            return Ok(contents);
        }

        let contents: Arc<str> = std::fs::read_to_string(path)?.into();
        self.files.insert(path.to_path_buf(), Arc::clone(&contents));
        Ok(contents)
    }

    fn explain(&self, message: fmt::Arguments<'_>) {
        debug!(explain = %message, "lookup explain");
        if let Some(log) = &self.explain_log {
            log.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_string());
        }
    }
}

fn interpolate_scope(input: &str, scope: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = after[..end].trim();
                let name = name.strip_prefix("::").unwrap_or(name);
                if let Some(value) = scope.get(name) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated expression is kept verbatim.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
