use std::process::ExitCode;

use tss_lookup::cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    cli::run_cli().await
}
