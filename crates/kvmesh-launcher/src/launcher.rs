//! Sequential cluster launch
//!
//! Nodes start one at a time in declaration order, so every parent is
//! already running when its children are spawned. There is no rollback:
//! nodes that started before a failure keep running.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use kvmesh_core::{
    LaunchConfig, NodeSpec, ReadinessConfig, SpawnFailurePolicy, Topology, WindowBackend,
};

use crate::error::Result;
use crate::readiness::{wait_until_ready, Readiness};
use crate::spawner::{ConsoleSpawner, ProcessSpawner};
use crate::tiler::{Placement, WindowTiler};
use crate::window::WmctrlWindowManager;

/// What happened to each node of a launch, by port
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSummary {
    /// Spawned successfully
    pub launched: Vec<u16>,
    /// Spawn call failed
    pub failed: Vec<u16>,
    /// Not attempted because an ancestor failed
    pub skipped: Vec<u16>,
    /// Spawned, but readiness probing timed out
    pub not_ready: Vec<u16>,
    /// Spawned, but the window could not be placed
    pub unplaced: Vec<u16>,
}

impl LaunchSummary {
    /// Whether every declared node is running
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Starts a topology node by node and tiles the windows
pub struct TopologyLauncher {
    spawner: Arc<dyn ProcessSpawner>,
    tiler: Option<WindowTiler>,
    readiness: ReadinessConfig,
    on_spawn_failure: SpawnFailurePolicy,
}

impl TopologyLauncher {
    pub fn new(
        spawner: Arc<dyn ProcessSpawner>,
        tiler: Option<WindowTiler>,
        readiness: ReadinessConfig,
        on_spawn_failure: SpawnFailurePolicy,
    ) -> Self {
        Self {
            spawner,
            tiler,
            readiness,
            on_spawn_failure,
        }
    }

    /// Build a launcher using console windows and the configured window backend
    pub fn from_config(config: &LaunchConfig) -> Result<Self> {
        config.validate()?;

        let spawner = Arc::new(ConsoleSpawner::new(
            config.node_command.clone(),
            config.console.clone(),
        ));
        let tiler = match config.window_backend {
            WindowBackend::Wmctrl => Some(WindowTiler::new(
                Arc::new(WmctrlWindowManager::default()),
                config.tiles,
                config.window_lookup,
            )),
            WindowBackend::Disabled => None,
        };

        Ok(Self::new(
            spawner,
            tiler,
            config.readiness,
            config.on_spawn_failure,
        ))
    }

    /// Validate a raw declaration, then launch it
    ///
    /// A malformed declaration is rejected before any process is spawned.
    pub async fn launch_nodes(&self, nodes: Vec<NodeSpec>) -> Result<LaunchSummary> {
        let topology = Topology::new(nodes)?;
        self.launch(&topology).await
    }

    /// Launch every node of `topology` in declaration order
    pub async fn launch(&self, topology: &Topology) -> Result<LaunchSummary> {
        info!(nodes = topology.len(), "Launching cluster");

        let mut summary = LaunchSummary::default();
        // Ports that will never come up: failed spawns and their descendants
        let mut down: HashSet<u16> = HashSet::new();

        for (index, node) in topology.nodes().iter().enumerate() {
            if let Some(parent) = node.parent_port.filter(|p| down.contains(p)) {
                warn!(port = node.port, parent, "Parent is down, skipping node");
                down.insert(node.port);
                summary.skipped.push(node.port);
                continue;
            }

            let handle = match self.spawner.spawn(node).await {
                Ok(handle) => handle,
                Err(err) => match self.on_spawn_failure {
                    SpawnFailurePolicy::Abort => {
                        warn!(port = node.port, error = %err, "Spawn failed, aborting launch");
                        return Err(err);
                    }
                    SpawnFailurePolicy::Skip => {
                        warn!(port = node.port, error = %err, "Spawn failed, skipping node");
                        down.insert(node.port);
                        summary.failed.push(node.port);
                        continue;
                    }
                },
            };

            info!(
                port = node.port,
                parent = ?node.parent_port,
                title = %handle.window_title,
                pid = ?handle.pid,
                spawned_at = %handle.spawn_time,
                "Spawned node"
            );
            summary.launched.push(node.port);

            if wait_until_ready(&self.readiness, node.port).await == Readiness::TimedOut {
                warn!(port = node.port, "Node did not become ready in time");
                summary.not_ready.push(node.port);
            }

            let Some(tiler) = &self.tiler else {
                continue;
            };
            match tiler.place(&handle.window_title, index as u32).await {
                Ok(Placement::Placed(slot)) => {
                    debug!(port = node.port, x = slot.x, y = slot.y, "Window tiled");
                }
                Ok(Placement::NotFound) => summary.unplaced.push(node.port),
                Err(err) => {
                    warn!(port = node.port, error = %err, "Window placement failed");
                    summary.unplaced.push(node.port);
                }
            }
        }

        info!(
            launched = summary.launched.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped.len(),
            not_ready = summary.not_ready.len(),
            unplaced = summary.unplaced.len(),
            "Launch finished"
        );
        Ok(summary)
    }
}
