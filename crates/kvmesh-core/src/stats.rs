//! Latency and throughput statistics
//!
//! Everything here is pure. Percentiles use linear interpolation between the
//! two closest ranks (`rank = p / 100 * (n - 1)`), the same definition most
//! numeric libraries use by default.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Summary of a latency sample, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyDistribution {
    pub mean: f64,
    pub median: f64,
    #[serde(rename = "90th_percentile")]
    pub p90: f64,
    #[serde(rename = "99th_percentile")]
    pub p99: f64,
}

impl LatencyDistribution {
    /// Summarize `samples`; `None` when there are no finite samples
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|s| s.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Some(Self {
            mean,
            median: percentile(&sorted, 50.0),
            p90: percentile(&sorted, 90.0),
            p99: percentile(&sorted, 99.0),
        })
    }
}

/// Linear-interpolated percentile of an ascending slice
///
/// `p` is clamped to `[0, 100]`. Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let weight = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * weight
        }
    }
}

/// Requests per second over `elapsed_secs`; 0 when no time has passed
pub fn throughput(elapsed_secs: f64, total_requests: usize) -> f64 {
    if elapsed_secs > 0.0 {
        total_requests as f64 / elapsed_secs
    } else {
        0.0
    }
}

/// Elapsed seconds between two instants and the resulting throughput
///
/// An `end` earlier than `start` counts as zero elapsed time.
pub fn measure_throughput(start: Instant, end: Instant, total_requests: usize) -> (f64, f64) {
    let elapsed = end.saturating_duration_since(start).as_secs_f64();
    (elapsed, throughput(elapsed, total_requests))
}

/// Success and error rates; both 0 when nothing was issued
pub fn outcome_rates(successes: usize, failures: usize) -> (f64, f64) {
    let total = successes + failures;
    if total == 0 {
        return (0.0, 0.0);
    }
    let success_rate = successes as f64 / total as f64;
    (success_rate, 1.0 - success_rate)
}
