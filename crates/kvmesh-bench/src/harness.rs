//! The benchmark loop
//!
//! Every workload item gets a POST, a GET and a DELETE, in that order, each
//! sent to an independently chosen node. Because the three calls usually land
//! on different nodes, the run measures how the store propagates writes across
//! the cluster as well as raw request latency.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::info;

use kvmesh_core::stats::{measure_throughput, outcome_rates};
use kvmesh_core::{BenchConfig, LatencyDistribution, Operation, WorkloadItem};

use crate::client::{HttpStoreClient, StoreClient};
use crate::error::Result;
use crate::report::{
    check_output_path, BenchmarkReport, KeyResult, PerformanceMetrics, RequestRecord, ResponseBody,
};
use crate::selector::{RandomSelector, TargetSelector};

/// Drives a workload against the cluster
pub struct BenchmarkHarness<C, S> {
    client: C,
    selector: S,
    pacing: Duration,
}

impl<C: StoreClient, S: TargetSelector> BenchmarkHarness<C, S> {
    pub fn new(client: C, selector: S) -> Self {
        Self {
            client,
            selector,
            pacing: Duration::ZERO,
        }
    }

    /// Pause after every call, whatever its outcome
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run the whole workload sequentially and summarize it
    pub async fn run(&mut self, workload: &[WorkloadItem]) -> BenchmarkReport {
        let mut results = Vec::with_capacity(workload.len());
        let mut tally = Tally::with_capacity(workload.len() * Operation::SEQUENCE.len());

        let start = Instant::now();

        for item in workload {
            let post = self.call(Operation::Post, item, &mut tally).await;
            let get = self.call(Operation::Get, item, &mut tally).await;
            let delete = self.call(Operation::Delete, item, &mut tally).await;
            results.push(KeyResult::from_records([post, get, delete]));
        }

        let end = Instant::now();
        let total_requests = tally.latencies.len();
        let (elapsed_seconds, throughput) = measure_throughput(start, end, total_requests);
        let (success_rate, error_rate) = outcome_rates(tally.successes, tally.failures);

        let metrics = PerformanceMetrics {
            total_requests,
            successful_requests: tally.successes,
            failed_requests: tally.failures,
            elapsed_seconds,
            throughput,
            success_rate,
            error_rate,
            response_times: LatencyDistribution::from_samples(&tally.latencies),
        };
        log_summary(&metrics);

        BenchmarkReport {
            results,
            performance_metrics: metrics,
        }
    }

    /// Issue one call, count it, then apply pacing
    async fn call(
        &mut self,
        operation: Operation,
        item: &WorkloadItem,
        tally: &mut Tally,
    ) -> RequestRecord {
        let record = self.issue(operation, item).await;
        tally.record(&record);

        if !self.pacing.is_zero() {
            sleep(self.pacing).await;
        }
        record
    }

    /// Send one timed call; transport failures become failed records
    async fn issue(&mut self, operation: Operation, item: &WorkloadItem) -> RequestRecord {
        let port = self.selector.next_port();

        let started = Instant::now();
        let outcome = self.client.send(port, operation, item).await;
        let latency_seconds = started.elapsed().as_secs_f64();

        let (status_code, response) = match outcome {
            Ok(reply) => (Some(reply.status), ResponseBody::text(reply.body)),
            Err(err) => (None, ResponseBody::transport_error(err.to_string())),
        };

        info!(
            operation = %operation,
            key = %item.key,
            port,
            status = ?status_code,
            latency = format_args!("{latency_seconds:.6}s"),
            response = %response.text,
            "Request complete"
        );

        RequestRecord {
            operation,
            key: item.key.clone(),
            target_port: port,
            latency_seconds,
            status_code,
            response,
        }
    }
}

/// Running counts of a benchmark run
#[derive(Default)]
struct Tally {
    latencies: Vec<f64>,
    successes: usize,
    failures: usize,
}

impl Tally {
    fn with_capacity(calls: usize) -> Self {
        Self {
            latencies: Vec::with_capacity(calls),
            ..Default::default()
        }
    }

    fn record(&mut self, record: &RequestRecord) {
        self.latencies.push(record.latency_seconds);
        if record.is_success() {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }
}

fn log_summary(metrics: &PerformanceMetrics) {
    info!(
        total = metrics.total_requests,
        elapsed = format_args!("{:.2}s", metrics.elapsed_seconds),
        throughput = format_args!("{:.2} req/s", metrics.throughput),
        success_rate = format_args!("{:.2}%", metrics.success_rate * 100.0),
        error_rate = format_args!("{:.2}%", metrics.error_rate * 100.0),
        "Benchmark finished"
    );
    if let Some(dist) = &metrics.response_times {
        info!(
            mean = format_args!("{:.6}s", dist.mean),
            median = format_args!("{:.6}s", dist.median),
            p90 = format_args!("{:.6}s", dist.p90),
            p99 = format_args!("{:.6}s", dist.p99),
            "Response time distribution"
        );
    }
}

/// Validate `config`, run it over HTTP and write the report
pub async fn run_from_config(config: &BenchConfig) -> Result<BenchmarkReport> {
    config.validate()?;
    check_output_path(&config.output)?;

    let client = HttpStoreClient::new(config.host.clone(), config.request_timeout)?;
    let selector = RandomSelector::seeded(config.ports.clone(), config.seed)?;

    info!(
        items = config.workload.len(),
        ports = config.ports.len(),
        seed = ?config.seed,
        pacing = ?config.pacing,
        "Starting benchmark"
    );

    let report = BenchmarkHarness::new(client, selector)
        .with_pacing(config.pacing)
        .run(&config.workload)
        .await;

    report.write_to(&config.output)?;
    info!(path = %config.output.display(), "Report written");

    Ok(report)
}
