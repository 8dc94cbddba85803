//! kvmesh Bench - load-tests a running store cluster
//!
//! For every workload item the harness issues a POST, a GET and a DELETE,
//! each to a node chosen by a [`TargetSelector`], records status, body and
//! latency, and summarizes the run as a [`BenchmarkReport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use kvmesh_core::BenchConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = kvmesh_bench::run_from_config(&BenchConfig::default()).await?;
//!     println!("{} requests", report.performance_metrics.total_requests);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod harness;
pub mod report;
pub mod selector;

pub use client::{HttpStoreClient, StoreClient, StoreReply, BODY_READ_ERROR_PREFIX, KEY_PATH};
pub use error::{BenchError, Result, TransportError};
pub use harness::{run_from_config, BenchmarkHarness};
pub use report::{
    check_output_path, BenchmarkReport, KeyResult, PerformanceMetrics, RequestRecord, ResponseBody,
    TRANSPORT_ERROR_LABEL,
};
pub use selector::{RandomSelector, RoundRobinSelector, TargetSelector};
