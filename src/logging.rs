// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "struts-probe", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Picks the filter directive: `--debug` wins, then `RUST_LOG`, then
/// `STRUTS_PROBE_LOGLEVEL`, then `info` for this crate.
fn log_directive(debug: bool) -> String {
    if debug {
        return format!("{}=debug", env!("CARGO_CRATE_NAME"));
    }
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")))
}

/// Initializes logging to stderr and, if asked, to a file in the data directory.
pub fn initialize_logging(debug: bool, to_file: bool) -> Result<()> {
    let directive = log_directive(debug);

    let stderr_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(&directive));

    let file_subscriber = if to_file {
        let directory = get_data_dir();
        std::fs::create_dir_all(&directory)?;
        let log_file = std::fs::File::create(directory.join(LOG_FILE.clone()))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_target(false)
                .with_ansi(false)
                .with_filter(EnvFilter::new(&directive)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(stderr_subscriber)
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    if debug {
        tracing::debug!("Running at Debug level.");
    }
    Ok(())
}
