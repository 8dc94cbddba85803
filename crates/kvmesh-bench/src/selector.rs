//! Choosing which node receives each request

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BenchError, Result};

/// Picks the destination port of the next request
pub trait TargetSelector: Send {
    fn next_port(&mut self) -> u16;
}

/// Uniform random choice over the candidate ports
#[derive(Debug, Clone)]
pub struct RandomSelector<R> {
    ports: Vec<u16>,
    rng: R,
}

impl<R: Rng> RandomSelector<R> {
    /// Selector over `ports` driven by `rng`
    pub fn with_rng(ports: Vec<u16>, rng: R) -> Result<Self> {
        if ports.is_empty() {
            return Err(BenchError::NoCandidatePorts);
        }
        Ok(Self { ports, rng })
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }
}

impl RandomSelector<StdRng> {
    /// Reproducible with `Some(seed)`, entropy-seeded otherwise
    pub fn seeded(ports: Vec<u16>, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(ports, rng)
    }
}

impl<R: Rng + Send> TargetSelector for RandomSelector<R> {
    fn next_port(&mut self) -> u16 {
        // Non-empty by construction
        let index = self.rng.gen_range(0..self.ports.len());
        self.ports[index]
    }
}

/// Cycles through a fixed port sequence
#[derive(Debug, Clone)]
pub struct RoundRobinSelector {
    ports: Vec<u16>,
    next: usize,
}

impl RoundRobinSelector {
    pub fn new(ports: Vec<u16>) -> Result<Self> {
        if ports.is_empty() {
            return Err(BenchError::NoCandidatePorts);
        }
        Ok(Self { ports, next: 0 })
    }
}

impl TargetSelector for RoundRobinSelector {
    fn next_port(&mut self) -> u16 {
        let port = self.ports[self.next];
        self.next = (self.next + 1) % self.ports.len();
        port
    }
}
