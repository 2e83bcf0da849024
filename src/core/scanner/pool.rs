// src/core/scanner/pool.rs

use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

use crate::core::models::{ScanSummary, Target};
use crate::core::report::Reporter;
use crate::core::scanner::prober::Probe;
use crate::errors::ScanError;

type SharedQueue = Arc<Mutex<mpsc::Receiver<Target>>>;

/// A fixed set of workers draining one shared queue of targets.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: usize,
}

impl WorkerPool {
    pub fn new(concurrency: usize) -> Result<Self, ScanError> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(concurrency));
        }
        Ok(Self { concurrency })
    }

    /// Probes every target exactly once and returns when all of them are done.
    ///
    /// All workers are spawned before the first target is queued. The queue is
    /// closed once the last target is in, and the workers are then awaited
    /// together, so up to `concurrency` probes are always in flight.
    ///
    /// # Arguments
    /// * `targets` - The targets to probe, consumed lazily by the producer.
    /// * `total` - The number of targets, reported when the scan starts.
    /// * `prober` - The probe implementation shared by every worker.
    /// * `reporter` - Receives the scan counts and every probe result.
    ///
    /// # Returns
    /// The aggregated `ScanSummary`, or `ScanError::WorkerPanicked` if any worker
    /// died. The summary is reported in both cases.
    pub async fn run<I, P, R>(
        &self,
        targets: I,
        total: usize,
        prober: Arc<P>,
        reporter: Arc<R>,
    ) -> Result<ScanSummary, ScanError>
    where
        I: IntoIterator<Item = Target>,
        P: Probe,
        R: Reporter,
    {
        let started = Instant::now();
        let mut summary = ScanSummary::new(total);
        reporter.scan_started(total);

        let (tx, rx) = mpsc::channel::<Target>(self.concurrency);
        let queue: SharedQueue = Arc::new(Mutex::new(rx));

        let mut workers = Vec::with_capacity(self.concurrency);
        for worker_id in 0..self.concurrency {
            let queue = queue.clone();
            let prober = prober.clone();
            let reporter = reporter.clone();
            workers.push(tokio::spawn(async move {
                Self::worker(worker_id, queue, prober, reporter).await
            }));
        }
        // Workers hold the only receivers, so a send fails if they all die.
        drop(queue);
        debug!(workers = workers.len(), "Workers started.");

        let mut enqueued = 0;
        for target in targets {
            if tx.send(target).await.is_err() {
                // Only happens if every worker is gone.
                error!("All workers exited before the queue was drained.");
                break;
            }
            enqueued += 1;
        }
        drop(tx);
        reporter.targets_enqueued(enqueued);

        let mut panicked = 0;
        for joined in join_all(workers).await {
            match joined {
                Ok(tally) => summary.merge(&tally),
                Err(e) => {
                    error!(error = %e, "Scan worker panicked.");
                    panicked += 1;
                }
            }
        }

        summary.elapsed = started.elapsed();
        reporter.scan_finished(&summary);
        if panicked > 0 {
            return Err(ScanError::WorkerPanicked(panicked));
        }
        Ok(summary)
    }

    async fn worker<P: Probe, R: Reporter>(
        worker_id: usize,
        queue: SharedQueue,
        prober: Arc<P>,
        reporter: Arc<R>,
    ) -> ScanSummary {
        debug!(worker_id, "Worker started.");
        let mut tally = ScanSummary::new(0);

        loop {
            let next = {
                let mut rx = queue.lock().await;
                rx.recv().await
            };
            let Some(target) = next else { break };

            let result = prober.probe(&target).await;
            tally.record(&result);
            reporter.probe_finished(&result);
        }

        debug!(worker_id, probed = tally.probed, "Worker finished.");
        tally
    }
}
