//! # Observability
//!
//! `tracing` is the only observability surface: a span per lookup and a
//! stderr subscriber for the CLI. Hosts that install their own subscriber
//! simply skip [`init_logging`].

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
