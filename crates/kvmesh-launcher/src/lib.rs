//! kvmesh Launcher - starts a local store cluster and tiles its windows
//!
//! Each node of a validated [`Topology`](kvmesh_core::Topology) is spawned in
//! its own console window, given time (or a readiness probe) to come up, and
//! then has its window moved into the next free grid tile.
//!
//! # Example
//!
//! ```rust,no_run
//! use kvmesh_core::{LaunchConfig, Preset};
//! use kvmesh_launcher::TopologyLauncher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let launcher = TopologyLauncher::from_config(&LaunchConfig::default())?;
//!     let summary = launcher.launch(&Preset::Small.topology()?).await?;
//!     println!("launched {:?}", summary.launched);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod launcher;
pub mod readiness;
pub mod spawner;
pub mod tiler;
pub mod window;

pub use error::{LaunchError, Result};
pub use launcher::{LaunchSummary, TopologyLauncher};
pub use readiness::{wait_until_ready, Readiness};
pub use spawner::{ConsoleSpawner, ProcessHandle, ProcessSpawner};
pub use tiler::{Placement, WindowTiler};
pub use window::{WindowId, WindowManager, WmctrlWindowManager};
