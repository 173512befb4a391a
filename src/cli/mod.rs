//! # Command Line Interface
//!
//! `tss-lookup` resolves one or more keys against Secret Server in a single
//! session, so the access token is requested at most once per invocation.
//!
//! Options are layered: the `--options` YAML file, then `TSS_LOOKUP_*`
//! environment variables (a `.env` file is loaded first), then flags.

pub mod output;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use crate::config::LookupOptions;
use crate::lookup::{resolve, SessionContext};
use crate::observability::{init_logging, LoggingConfig};
use output::{print_output, KeyReport, OutputFormat};

/// Exit status when every key resolved but at least one was not found.
pub const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "tss-lookup")]
#[command(about = "Look up credentials stored in Secret Server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Keys to resolve, e.g. `secret_server::42`
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// YAML file with lookup options (bare or under `options:`)
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Secret Server base URI
    #[arg(long)]
    pub uri: Option<String>,

    /// Credential file with username/password/domain lines
    #[arg(long, value_name = "FILE")]
    pub auth_file: Option<PathBuf>,

    /// PEM CA bundle to trust
    #[arg(long, value_name = "FILE")]
    pub ca_file: Option<PathBuf>,

    /// Directory of PEM CA certificates to trust
    #[arg(long, value_name = "DIR")]
    pub ca_path: Option<PathBuf>,

    /// Disable TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Interpolation variable, repeatable
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Print diagnostic explanations to stderr
    #[arg(long)]
    pub explain: bool,

    /// Print secret values instead of [REDACTED]
    #[arg(long)]
    pub reveal: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Merge the options file, environment and flags, in that order.
    pub fn lookup_options(&self) -> anyhow::Result<LookupOptions> {
        let base = match &self.options {
            Some(path) => LookupOptions::from_yaml_file(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => LookupOptions::default(),
        };

        let mut options =
            base.with_env_overrides().context("Invalid TSS_LOOKUP_* environment override")?;

        if let Some(uri) = &self.uri {
            options.uri = Some(uri.clone());
        }
        if let Some(path) = &self.auth_file {
            options.auth_file = Some(path.clone());
        }
        if let Some(path) = &self.ca_file {
            options.ca_file = Some(path.clone());
        }
        if let Some(path) = &self.ca_path {
            options.ca_path = Some(path.clone());
        }
        if self.insecure {
            options.ssl_verify = Some(false);
        }

        Ok(options)
    }

    fn session(&self) -> SessionContext {
        let scope: HashMap<String, String> = self.vars.iter().cloned().collect();
        let context = SessionContext::new().with_scope(scope);
        if self.explain {
            context.with_explain()
        } else {
            context
        }
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<ExitCode> {
    if let Err(e) = dotenvy::dotenv() {
        // .env is optional; only a malformed file is worth mentioning.
        if !e.not_found() {
            eprintln!("Warning: failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    initialise_logging(cli.verbose);

    let options = cli.lookup_options()?;
    let context = cli.session();
    debug!(keys = cli.keys.len(), "Resolving keys");

    let mut reports = Vec::with_capacity(cli.keys.len());
    let mut failure = None;
    for key in &cli.keys {
        match resolve(key, &options, &context).await {
            Ok(result) => reports.push(KeyReport::new(key, result, cli.reveal)),
            Err(e) => {
                let err = anyhow::Error::new(e).context(format!("Lookup of '{}' failed", key));
                failure = Some(err);
                break;
            }
        }
    }

    for line in context.explanations() {
        eprintln!("explain: {}", line);
    }

    if let Some(err) = failure {
        return Err(err);
    }

    print_output(&reports, cli.format)?;

    if reports.iter().all(KeyReport::is_found) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_NOT_FOUND))
    }
}

fn initialise_logging(verbose: bool) {
    let mut config = LoggingConfig::from_env();
    if verbose {
        config.level = "tss_lookup=debug".to_string();
    }
    init_logging(&config);
}
