use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use struts_probe::config::ScanConfig;
use struts_probe::core::models::{ProbeError, ProbeResult, ScanSummary, Target};
use struts_probe::core::report::Reporter;
use struts_probe::core::scanner::pool::WorkerPool;
use struts_probe::core::scanner::prober::Probe;
use struts_probe::core::scanner::run_scan;
use struts_probe::core::scanner::targets::TargetExpander;
use struts_probe::errors::ScanError;
use wiremock::{matchers::method, Mock, MockServer, Request, ResponseTemplate};

/// Sleeps for a fixed latency and records every target it sees. Hosts starting
/// with "vuln" are reported vulnerable, hosts starting with "down" fail and
/// hosts starting with "panic" bring the worker down.
struct FakeProber {
    latency: Duration,
    seen: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeProber {
    fn new(latency: Duration) -> Self {
        Self {
            latency,
            seen: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl Probe for FakeProber {
    async fn probe(&self, target: &Target) -> ProbeResult {
        if target.host().starts_with("panic") {
            panic!("worker crashed on {}", target);
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(target.url().to_string());

        let error = target
            .host()
            .starts_with("down")
            .then(|| ProbeError::Connect("refused".to_string()));
        ProbeResult {
            target: target.clone(),
            vulnerable: error.is_none() && target.host().starts_with("vuln"),
            status: error.is_none().then_some(200),
            error,
            elapsed: self.latency,
        }
    }
}

#[derive(Default)]
struct RecordingReporter {
    started: Mutex<Option<usize>>,
    enqueued: Mutex<Option<usize>>,
    results: Mutex<Vec<ProbeResult>>,
    finished: Mutex<Option<ScanSummary>>,
}

impl Reporter for RecordingReporter {
    fn scan_started(&self, total: usize) {
        *self.started.lock().unwrap() = Some(total);
    }

    fn targets_enqueued(&self, count: usize) {
        *self.enqueued.lock().unwrap() = Some(count);
    }

    fn probe_finished(&self, result: &ProbeResult) {
        self.results.lock().unwrap().push(result.clone());
    }

    fn scan_finished(&self, summary: &ScanSummary) {
        *self.finished.lock().unwrap() = Some(summary.clone());
    }
}

fn hosts(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

#[tokio::test]
async fn test_every_target_probed_exactly_once() {
    let hosts: Vec<String> = (0..25).map(|i| format!("h{}.test", i)).collect();
    let ports = [80, 443, 8080];
    let expander = TargetExpander::new(&hosts, &ports);

    let prober = Arc::new(FakeProber::new(Duration::from_millis(5)));
    let reporter = Arc::new(RecordingReporter::default());
    let summary = WorkerPool::new(7)
        .unwrap()
        .run(expander, expander.total(), prober.clone(), reporter.clone())
        .await
        .unwrap();

    assert_eq!(summary.total, 75);
    assert_eq!(summary.probed, 75);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for url in prober.seen.lock().unwrap().iter() {
        *counts.entry(url.clone()).or_default() += 1;
    }
    assert_eq!(counts.len(), 75);
    assert!(counts.values().all(|&n| n == 1));
    for target in expander.iter() {
        assert_eq!(counts.get(target.url()), Some(&1));
    }

    assert_eq!(*reporter.started.lock().unwrap(), Some(75));
    assert_eq!(*reporter.enqueued.lock().unwrap(), Some(75));
    assert_eq!(reporter.results.lock().unwrap().len(), 75);
}

#[tokio::test]
async fn test_probes_run_in_parallel() {
    let hosts: Vec<String> = (0..20).map(|i| format!("h{}.test", i)).collect();
    let ports = [80];
    let expander = TargetExpander::new(&hosts, &ports);
    let latency = Duration::from_millis(200);

    let prober = Arc::new(FakeProber::new(latency));
    let started = Instant::now();
    let summary = WorkerPool::new(10)
        .unwrap()
        .run(expander, expander.total(), prober.clone(), Arc::new(RecordingReporter::default()))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // ceil(20 / 10) rounds of 200ms; serial execution would take 4s.
    assert_eq!(summary.probed, 20);
    assert!(elapsed >= latency * 2);
    assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
    assert_eq!(prober.peak.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_single_worker_is_sequential() {
    let hosts = hosts(&["a.test", "b.test", "c.test"]);
    let ports = [80, 443];
    let expander = TargetExpander::new(&hosts, &ports);

    let prober = Arc::new(FakeProber::new(Duration::from_millis(1)));
    WorkerPool::new(1)
        .unwrap()
        .run(expander, expander.total(), prober.clone(), Arc::new(RecordingReporter::default()))
        .await
        .unwrap();

    assert_eq!(prober.peak.load(Ordering::SeqCst), 1);
    // One worker drains the queue in order.
    let expected: Vec<String> = expander.iter().map(|t| t.url().to_string()).collect();
    assert_eq!(*prober.seen.lock().unwrap(), expected);
}

#[tokio::test]
async fn test_more_workers_than_targets() {
    let hosts = hosts(&["a.test"]);
    let ports = [80];
    let expander = TargetExpander::new(&hosts, &ports);

    let prober = Arc::new(FakeProber::new(Duration::from_millis(1)));
    let summary = WorkerPool::new(50)
        .unwrap()
        .run(expander, expander.total(), prober.clone(), Arc::new(RecordingReporter::default()))
        .await
        .unwrap();

    assert_eq!(summary.probed, 1);
    assert_eq!(prober.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_target_list() {
    let hosts: Vec<String> = Vec::new();
    let ports = [80];
    let expander = TargetExpander::new(&hosts, &ports);

    let reporter = Arc::new(RecordingReporter::default());
    let summary = WorkerPool::new(4)
        .unwrap()
        .run(expander, 0, Arc::new(FakeProber::new(Duration::ZERO)), reporter.clone())
        .await
        .unwrap();

    assert_eq!(summary.probed, 0);
    assert_eq!(*reporter.enqueued.lock().unwrap(), Some(0));
    assert!(reporter.finished.lock().unwrap().is_some());
}

#[tokio::test]
async fn test_failures_do_not_stop_the_scan() {
    let hosts = hosts(&["down1.test", "vuln.test", "ok.test", "down2.test"]);
    let ports = [80];
    let expander = TargetExpander::new(&hosts, &ports);

    let reporter = Arc::new(RecordingReporter::default());
    let summary = WorkerPool::new(2)
        .unwrap()
        .run(expander, expander.total(), Arc::new(FakeProber::new(Duration::from_millis(2))), reporter.clone())
        .await
        .unwrap();

    assert_eq!((summary.probed, summary.vulnerable, summary.errors), (4, 1, 2));
    let finished = reporter.finished.lock().unwrap().clone().unwrap();
    assert_eq!((finished.probed, finished.vulnerable, finished.errors), (4, 1, 2));

    let results = reporter.results.lock().unwrap();
    let down: Vec<_> = results.iter().filter(|r| r.target.host().starts_with("down")).collect();
    assert_eq!(down.len(), 2);
    assert!(down.iter().all(|r| !r.vulnerable && r.error.is_some()));
    let ok = results.iter().find(|r| r.target.host() == "ok.test").unwrap();
    assert!(!ok.vulnerable && ok.error.is_none());
}

#[tokio::test]
async fn test_panicked_worker_still_reports_summary() {
    let hosts = hosts(&["a.test", "panic.test", "b.test", "vuln.test"]);
    let ports = [80];
    let expander = TargetExpander::new(&hosts, &ports);

    let reporter = Arc::new(RecordingReporter::default());
    let result = WorkerPool::new(2)
        .unwrap()
        .run(expander, expander.total(), Arc::new(FakeProber::new(Duration::from_millis(2))), reporter.clone())
        .await;

    assert!(matches!(result, Err(ScanError::WorkerPanicked(1))));
    let finished = reporter.finished.lock().unwrap().clone().unwrap();
    assert_eq!((finished.total, finished.probed, finished.vulnerable), (4, 3, 1));
    assert!(finished.elapsed > Duration::ZERO);
}

#[tokio::test]
async fn test_all_workers_panicking_does_not_hang() {
    let hosts: Vec<String> = (0..10).map(|i| format!("panic{}.test", i)).collect();
    let ports = [80];
    let expander = TargetExpander::new(&hosts, &ports);

    let reporter = Arc::new(RecordingReporter::default());
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        WorkerPool::new(1)
            .unwrap()
            .run(expander, expander.total(), Arc::new(FakeProber::new(Duration::ZERO)), reporter.clone()),
    )
    .await
    .expect("scan hung after its only worker died");

    assert!(matches!(result, Err(ScanError::WorkerPanicked(1))));
    assert_eq!(reporter.finished.lock().unwrap().as_ref().map(|s| s.probed), Some(0));
}

#[tokio::test]
async fn test_run_scan_against_mock_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(|req: &Request| {
            let token = req
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .and_then(|p| p.split("'X-Check-Struts', '").nth(1))
                .and_then(|rest| rest.split('\'').next())
                .unwrap_or_default()
                .to_string();
            ResponseTemplate::new(200).insert_header("X-Check-Struts", token.as_str())
        })
        .mount(&mock_server)
        .await;

    let addr = mock_server.address();
    let hosts = vec![addr.ip().to_string()];
    let config = ScanConfig::new(vec![addr.port()], 2, Duration::from_secs(5)).unwrap();
    let reporter = Arc::new(RecordingReporter::default());

    let summary = run_scan(&hosts, &config, reporter.clone()).await.unwrap();

    assert_eq!((summary.total, summary.probed, summary.vulnerable, summary.errors), (1, 1, 1, 0));
    let results = reporter.results.lock().unwrap();
    assert_eq!(results[0].target.url(), format!("http://{}:{}/", addr.ip(), addr.port()));
}
