// src/core/mod.rs

/// Data types shared across the scan: targets, tokens, probe results and the
/// scan summary.
pub mod models;

/// The reporting seam between the scan and the outside world.
pub mod report;

/// Target expansion, the CVE-2017-5638 prober and the worker pool.
pub mod scanner;
