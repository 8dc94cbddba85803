//! Waiting for a spawned node to come up
//!
//! `Fixed` mode sleeps a constant settle interval. `Probe` mode polls the
//! node's listening port with exponential backoff until a TCP connect
//! succeeds or the deadline passes.

use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};

use kvmesh_core::ReadinessConfig;

/// Result of waiting for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The settle interval passed, or the port accepted a connection
    Ready,
    /// The probe deadline passed without a successful connect
    TimedOut,
}

/// Wait until the node on `port` is considered up
pub async fn wait_until_ready(config: &ReadinessConfig, port: u16) -> Readiness {
    match *config {
        ReadinessConfig::Fixed { settle } => {
            sleep(settle).await;
            Readiness::Ready
        }
        ReadinessConfig::Probe {
            timeout: limit,
            initial_backoff,
            max_backoff,
        } => probe(port, limit, initial_backoff, max_backoff).await,
    }
}

async fn probe(port: u16, limit: Duration, initial: Duration, max: Duration) -> Readiness {
    let deadline = Instant::now() + limit;
    let mut backoff = initial;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if let Ok(Ok(_)) = timeout(remaining, TcpStream::connect((Ipv4Addr::LOCALHOST, port))).await
        {
            tracing::debug!(port, attempts, "Node accepted connection");
            return Readiness::Ready;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::debug!(port, attempts, "Readiness probe gave up");
            return Readiness::TimedOut;
        }

        sleep(backoff.min(remaining)).await;
        backoff = (backoff * 2).min(max);
    }
}
