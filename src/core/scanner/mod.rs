// src/core/scanner/mod.rs

pub mod pool;
pub mod prober;
pub mod targets;

use std::sync::Arc;

use crate::config::ScanConfig;
use crate::core::models::ScanSummary;
use crate::core::report::Reporter;
use self::pool::WorkerPool;
use self::prober::StrutsProber;
use self::targets::TargetExpander;

/// Runs a full CVE-2017-5638 scan of `hosts` on the configured ports.
///
/// Builds the shared prober, expands the targets lazily and hands both to a
/// worker pool sized by `config.concurrency`.
///
/// # Arguments
/// * `hosts` - The hosts to scan, in file order. Blank entries are kept.
/// * `config` - Ports, concurrency and per-probe timeout.
/// * `reporter` - Receives progress, every probe result and the final summary.
///
/// # Returns
/// The `ScanSummary` once every target has been probed, or a `ScanError` if the
/// pool or the HTTP client could not be set up.
pub async fn run_scan<R: Reporter>(
    hosts: &[String],
    config: &ScanConfig,
    reporter: Arc<R>,
) -> Result<ScanSummary, crate::errors::ScanError> {
    let pool = WorkerPool::new(config.concurrency)?;
    let prober = Arc::new(StrutsProber::new(config.timeout)?);
    let expander = TargetExpander::new(hosts, &config.ports);

    pool.run(expander, expander.total(), prober, reporter).await
}
