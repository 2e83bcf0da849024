// src/input.rs

use std::fs;
use std::path::Path;
use tracing::info;

use crate::errors::InputError;

/// Reads one host per line. Lines are trimmed but blank ones are kept.
pub fn load_targets(path: &Path) -> Result<Vec<String>, InputError> {
    let contents = fs::read_to_string(path).map_err(|source| InputError {
        path: path.to_path_buf(),
        source,
    })?;
    let hosts = parse_targets(&contents);
    info!(targets = hosts.len(), "Done reading targets.");
    Ok(hosts)
}

pub fn parse_targets(contents: &str) -> Vec<String> {
    contents.lines().map(|line| line.trim().to_string()).collect()
}
