// src/core/report.rs

use tracing::{debug, info, warn};

use crate::core::models::{ProbeOutcome, ProbeResult, ScanSummary};

/// Receives scan progress. Injected into the worker pool so the scan itself
/// never touches global logging state.
pub trait Reporter: Send + Sync + 'static {
    /// Called once, before any target is queued, with the expected count.
    fn scan_started(&self, total: usize);
    /// Called once the producer has queued its last target.
    fn targets_enqueued(&self, count: usize);
    /// Called by a worker for each finished probe, in completion order.
    fn probe_finished(&self, result: &ProbeResult);
    /// Called after every worker has exited, even if one of them panicked.
    fn scan_finished(&self, summary: &ScanSummary);
}

/// Reports through `tracing`: counts at `info`, per-target lines at `debug`,
/// findings at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn scan_started(&self, total: usize) {
        info!(targets = total, "Starting scan.");
    }

    fn targets_enqueued(&self, count: usize) {
        info!(targets = count, "Done making targets.");
    }

    fn probe_finished(&self, result: &ProbeResult) {
        let outcome = result.outcome();
        debug!(
            url = %result.target,
            port = result.target.port(),
            outcome = %outcome,
            status = ?result.status,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Checked target."
        );
        match outcome {
            ProbeOutcome::Vulnerable => {
                warn!(url = %result.target, "CVE-2017-5638 vulnerability found!");
            }
            ProbeOutcome::TransportFailed => {
                if let Some(e) = &result.error {
                    debug!(url = %result.target, error = %e, "Error making request.");
                }
            }
            ProbeOutcome::NotVulnerable => {}
        }
    }

    fn scan_finished(&self, summary: &ScanSummary) {
        info!(
            targets = summary.total,
            probed = summary.probed,
            vulnerable = summary.vulnerable,
            errors = summary.errors,
            started_at = %summary.started_at.to_rfc3339(),
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "Scan finished."
        );
    }
}
