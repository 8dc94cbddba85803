//! kvmesh Core - shared types for launching and benchmarking a local
//! key-value store cluster
//!
//! # Modules
//!
//! - [`topology`] - Node declarations and tree validation
//! - [`tiling`] - Window grid placement
//! - [`stats`] - Latency distribution and throughput
//! - [`workload`] - Benchmark workload items and operations
//! - [`presets`] - Built-in topologies and workload
//! - [`config`] - Launch and benchmark configuration
//! - [`error`] - Topology and configuration errors
//!
//! # Example
//!
//! ```rust
//! use kvmesh_core::{presets::Preset, tiling::TileGrid};
//!
//! let topology = Preset::Small.topology().unwrap();
//! let grid = TileGrid::new(350, 200, 1000, 800);
//!
//! for (index, node) in topology.nodes().iter().enumerate() {
//!     let slot = grid.slot(index as u32);
//!     println!("{} -> ({}, {})", node.window_title(), slot.x, slot.y);
//! }
//! ```

pub mod config;
pub mod error;
pub mod presets;
pub mod stats;
pub mod tiling;
pub mod topology;
pub mod workload;

// Re-exports for convenience
pub use config::{
    BenchConfig, CommandTemplate, LaunchConfig, ReadinessConfig, SpawnFailurePolicy,
    WindowBackend, WindowLookupConfig,
};
pub use error::{ConfigError, Result, TopologyError};
pub use presets::Preset;
pub use stats::LatencyDistribution;
pub use tiling::{TileGrid, WindowSlot};
pub use topology::{NodeSpec, Topology};
pub use workload::{Operation, WorkloadItem};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
