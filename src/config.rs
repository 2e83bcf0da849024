// src/config.rs

use clap::Parser;
use clap::builder::FalseyValueParser;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Mass-check hosts for the Struts2 Content-Type RCE (CVE-2017-5638).
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing targets, one host per line.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Ports to check.
    #[arg(short, long, value_delimiter = ',', default_values_t = [DEFAULT_PORT])]
    pub ports: Vec<u16>,

    /// Concurrent HTTP requests.
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout on HTTP requests, in seconds.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Log at debug level. `DEBUG` counts as set unless it is empty, `0`,
    /// `false`, `no`, `off` or `n`.
    #[arg(long, env = "DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Also write the log to a file in the local data directory.
    #[arg(long)]
    pub log_file: bool,
}

/// Settings fixed for the duration of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub ports: Vec<u16>,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl ScanConfig {
    pub fn new(ports: Vec<u16>, concurrency: usize, timeout: Duration) -> Result<Self, ConfigError> {
        if ports.is_empty() {
            return Err(ConfigError::NoPorts);
        }
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self { ports, concurrency, timeout })
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: vec![DEFAULT_PORT],
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl TryFrom<&Cli> for ScanConfig {
    type Error = ConfigError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        ScanConfig::new(cli.ports.clone(), cli.concurrency, Duration::from_secs(cli.timeout))
    }
}
