// src/errors.rs

use std::path::PathBuf;
use thiserror::Error;

/// The target list could not be read. Fatal: nothing is probed.
#[derive(Debug, Error)]
#[error("failed to read targets from {path}")]
pub struct InputError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("timeout must be at least 1 second")]
    ZeroTimeout,
    #[error("at least one port is required")]
    NoPorts,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid concurrency {0}: at least one worker is required")]
    InvalidConcurrency(usize),
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    #[error("{0} scan worker(s) panicked")]
    WorkerPanicked(usize),
}
