//! Recording fakes for the spawner and window manager seams

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use kvmesh_core::{NodeSpec, ReadinessConfig, SpawnFailurePolicy, TileGrid, WindowLookupConfig};
use kvmesh_launcher::{
    LaunchError, ProcessHandle, ProcessSpawner, Result, TopologyLauncher, WindowId,
    WindowManager, WindowTiler,
};

/// Records every spawn; ports in `failing` are refused
#[derive(Default)]
pub struct RecordingSpawner {
    pub spawned: Mutex<Vec<NodeSpec>>,
    pub failing: HashSet<u16>,
}

impl RecordingSpawner {
    pub fn failing_on(ports: &[u16]) -> Self {
        Self {
            spawned: Mutex::new(Vec::new()),
            failing: ports.iter().copied().collect(),
        }
    }

    pub fn spawned_ports(&self) -> Vec<u16> {
        self.spawned.lock().iter().map(|n| n.port).collect()
    }
}

#[async_trait]
impl ProcessSpawner for RecordingSpawner {
    async fn spawn(&self, node: &NodeSpec) -> Result<ProcessHandle> {
        if self.failing.contains(&node.port) {
            return Err(LaunchError::Spawn {
                port: node.port,
                reason: "executable not found".into(),
            });
        }
        self.spawned.lock().push(*node);
        Ok(ProcessHandle::new(node.window_title()))
    }
}

/// Knows a fixed set of window titles and records geometry changes
#[derive(Default)]
pub struct FakeWindows {
    pub titles: HashSet<String>,
    pub moves: Mutex<Vec<(String, u32, u32)>>,
    pub resizes: Mutex<Vec<(String, u32, u32)>>,
}

impl FakeWindows {
    pub fn with_titles<I: IntoIterator<Item = u16>>(ports: I) -> Self {
        Self {
            titles: ports.into_iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn positions(&self) -> Vec<(String, u32, u32)> {
        self.moves.lock().clone()
    }
}

#[async_trait]
impl WindowManager for FakeWindows {
    async fn find_window(&self, title: &str) -> Result<Option<WindowId>> {
        Ok(self
            .titles
            .contains(title)
            .then(|| WindowId(title.to_string())))
    }

    async fn move_window(&self, id: &WindowId, x: u32, y: u32) -> Result<()> {
        self.moves.lock().push((id.0.clone(), x, y));
        Ok(())
    }

    async fn resize_window(&self, id: &WindowId, width: u32, height: u32) -> Result<()> {
        self.resizes.lock().push((id.0.clone(), width, height));
        Ok(())
    }
}

/// Launcher over the fakes with no settle delay
pub fn launcher(
    spawner: Arc<RecordingSpawner>,
    windows: Arc<FakeWindows>,
    grid: TileGrid,
    policy: SpawnFailurePolicy,
) -> TopologyLauncher {
    let tiler = WindowTiler::new(
        windows,
        grid,
        WindowLookupConfig {
            attempts: 1,
            interval: Duration::ZERO,
        },
    );
    TopologyLauncher::new(
        spawner,
        Some(tiler),
        ReadinessConfig::Fixed {
            settle: Duration::ZERO,
        },
        policy,
    )
}
