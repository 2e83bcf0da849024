// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::sync::Arc;

use struts_probe::config::{Cli, ScanConfig};
use struts_probe::core::report::TracingReporter;
use struts_probe::core::scanner::run_scan;
use struts_probe::input::load_targets;
use struts_probe::logging::initialize_logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    initialize_logging(cli.debug, cli.log_file)?;

    let config = ScanConfig::try_from(&cli).wrap_err("invalid scan settings")?;
    let hosts = load_targets(&cli.file)?;
    tracing::debug!(hosts = hosts.len(), ports = config.ports.len(), "Loaded scan input.");

    run_scan(&hosts, &config, Arc::new(TracingReporter))
        .await
        .wrap_err("scan failed")?;
    Ok(())
}
