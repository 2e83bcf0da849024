// src/core/scanner/prober.rs

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::core::models::{CHECK_HEADER, ProbeError, ProbeRequest, ProbeResult, Target};
use crate::errors::ScanError;

/// Something that can probe a single target.
///
/// The worker pool only depends on this trait, so any probe implementation can
/// be plugged into it.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, target: &Target) -> impl Future<Output = ProbeResult> + Send;
}

/// Probes for the Struts2 Content-Type OGNL injection (CVE-2017-5638).
///
/// A single `reqwest::Client` is built here and shared by every probe, so all
/// workers reuse one connection pool.
#[derive(Debug, Clone)]
pub struct StrutsProber {
    client: Client,
    timeout: Duration,
}

impl StrutsProber {
    /// Builds the prober's HTTP client.
    ///
    /// Certificate validation is switched off for this client only: scanned
    /// hosts routinely present self-signed or mismatched certificates.
    ///
    /// # Arguments
    /// * `timeout` - Upper bound for a whole probe, connect to response.
    ///
    /// # Returns
    /// The prober, or `ScanError::HttpClient` if the TLS backend fails to
    /// initialize.
    pub fn new(timeout: Duration) -> Result<Self, ScanError> {
        let client = Client::builder()
            .user_agent(concat!("struts-probe/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()
            .map_err(ScanError::HttpClient)?;
        Ok(Self { client, timeout })
    }

    async fn send(&self, request: &ProbeRequest<'_>) -> Result<(bool, u16), ProbeError> {
        let response = self
            .client
            .get(request.target.url())
            .header(CONTENT_TYPE, request.payload())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        let status = response.status().as_u16();
        let reflected = response.headers().get(CHECK_HEADER).map(|v| v.as_bytes());
        trace!(url = %request.target, status, reflected = ?reflected.map(String::from_utf8_lossy), "Response received.");
        let vulnerable = reflected == Some(request.token.as_str().as_bytes());

        // Drops the body without reading it, which releases the connection.
        drop(response);
        Ok((vulnerable, status))
    }
}

impl Probe for StrutsProber {
    async fn probe(&self, target: &Target) -> ProbeResult {
        let request = ProbeRequest::new(target, self.timeout);
        debug!(url = %target, token = %request.token, "Sending probe.");
        let started = Instant::now();

        let (vulnerable, status, error) = match self.send(&request).await {
            Ok((vulnerable, status)) => (vulnerable, Some(status), None),
            Err(e) => (false, None, Some(e)),
        };

        ProbeResult {
            target: target.clone(),
            vulnerable,
            error,
            status,
            elapsed: started.elapsed(),
        }
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout(timeout)
    } else if error.is_connect() {
        ProbeError::Connect(error_chain(&error))
    } else {
        ProbeError::Request(error_chain(&error))
    }
}

/// Flattens the error and its sources; reqwest keeps the useful part (DNS,
/// refused, TLS) in the source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
