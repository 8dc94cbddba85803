//! Topology launch tests over fake spawner and window manager
//!
//! Run: cargo test -p kvmesh-launcher --test launch_test

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{launcher, FakeWindows, RecordingSpawner};
use kvmesh_core::{
    NodeSpec, Preset, ReadinessConfig, SpawnFailurePolicy, TileGrid, TopologyError,
};
use kvmesh_launcher::{LaunchError, TopologyLauncher};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kvmesh_launcher=debug")
        .with_test_writer()
        .try_init();
}

/// A declaration referencing an undeclared parent spawns nothing
#[tokio::test]
async fn test_unknown_parent_rejected_before_spawn() {
    init_tracing();

    let spawner = Arc::new(RecordingSpawner::default());
    let windows = Arc::new(FakeWindows::default());
    let launcher = launcher(
        spawner.clone(),
        windows,
        TileGrid::default(),
        SpawnFailurePolicy::Skip,
    );

    let err = launcher
        .launch_nodes(vec![
            NodeSpec::root(8080),
            NodeSpec::child(8081, 8080),
            NodeSpec::child(8082, 9999),
        ])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LaunchError::Topology(TopologyError::UnknownParent {
            port: 8082,
            parent: 9999
        })
    ));
    assert!(err.is_validation_error());
    assert!(spawner.spawned_ports().is_empty(), "no process may be spawned");
}

/// Five windows of 350x200 on a 1000px wide screen wrap after two columns
#[tokio::test]
async fn test_windows_tiled_in_declaration_order() {
    init_tracing();

    let ports = [8080, 8081, 8082, 8083, 8084];
    let spawner = Arc::new(RecordingSpawner::default());
    let windows = Arc::new(FakeWindows::with_titles(ports));
    let launcher = launcher(
        spawner.clone(),
        windows.clone(),
        TileGrid::new(350, 200, 1000, 800),
        SpawnFailurePolicy::Skip,
    );

    let summary = launcher
        .launch_nodes(vec![
            NodeSpec::root(8080),
            NodeSpec::child(8081, 8080),
            NodeSpec::child(8082, 8080),
            NodeSpec::child(8083, 8081),
            NodeSpec::child(8084, 8080),
        ])
        .await
        .unwrap();

    assert_eq!(summary.launched, ports.to_vec());
    assert!(summary.is_complete());
    assert!(summary.unplaced.is_empty());
    assert_eq!(spawner.spawned_ports(), ports.to_vec());

    let expected = vec![
        ("8080".to_string(), 0, 0),
        ("8081".to_string(), 350, 0),
        ("8082".to_string(), 0, 200),
        ("8083".to_string(), 350, 200),
        ("8084".to_string(), 0, 400),
    ];
    assert_eq!(windows.positions(), expected);
    assert!(windows
        .resizes
        .lock()
        .iter()
        .all(|(_, w, h)| (*w, *h) == (350, 200)));
}

/// Spawn order follows the declaration, so parents always start first
#[tokio::test]
async fn test_parents_spawn_before_children() {
    let spawner = Arc::new(RecordingSpawner::default());
    let topology = Preset::Large.topology().unwrap();
    let windows = Arc::new(FakeWindows::with_titles(topology.ports()));
    let launcher = launcher(
        spawner.clone(),
        windows,
        TileGrid::default(),
        SpawnFailurePolicy::Skip,
    );

    launcher.launch(&topology).await.unwrap();

    let spawned = spawner.spawned.lock().clone();
    assert_eq!(spawned.len(), 20);
    for (i, node) in spawned.iter().enumerate() {
        if let Some(parent) = node.parent_port {
            assert!(
                spawned[..i].iter().any(|n| n.port == parent),
                "node {} spawned before its parent {}",
                node.port,
                parent
            );
        }
    }
}

/// A missing window is logged and the launch continues
#[tokio::test]
async fn test_missing_window_is_not_fatal() {
    init_tracing();

    let spawner = Arc::new(RecordingSpawner::default());
    // 8081's window never shows up
    let windows = Arc::new(FakeWindows::with_titles([8080, 8082]));
    let launcher = launcher(
        spawner.clone(),
        windows.clone(),
        TileGrid::new(350, 200, 1000, 800),
        SpawnFailurePolicy::Skip,
    );

    let summary = launcher
        .launch_nodes(vec![
            NodeSpec::root(8080),
            NodeSpec::child(8081, 8080),
            NodeSpec::child(8082, 8081),
        ])
        .await
        .unwrap();

    assert_eq!(summary.launched, vec![8080, 8081, 8082]);
    assert_eq!(summary.unplaced, vec![8081]);
    // 8082 keeps its own slot rather than taking the unused one
    assert_eq!(
        windows.positions(),
        vec![("8080".to_string(), 0, 0), ("8082".to_string(), 0, 200)]
    );
}

/// With the skip policy a failed node and its subtree are skipped
#[tokio::test]
async fn test_spawn_failure_skips_subtree() {
    init_tracing();

    let spawner = Arc::new(RecordingSpawner::failing_on(&[8081]));
    let windows = Arc::new(FakeWindows::with_titles(8080..8090));
    let launcher = launcher(
        spawner.clone(),
        windows,
        TileGrid::default(),
        SpawnFailurePolicy::Skip,
    );

    let summary = launcher.launch(&Preset::Small.topology().unwrap()).await.unwrap();

    // Small preset: 8083 and 8085 hang off 8081
    assert_eq!(summary.failed, vec![8081]);
    assert_eq!(summary.skipped, vec![8083, 8085]);
    assert_eq!(summary.launched, vec![8080, 8082, 8084]);
    assert!(!summary.is_complete());
    assert_eq!(spawner.spawned_ports(), vec![8080, 8082, 8084]);
}

/// With the abort policy the launch stops and earlier nodes stay up
#[tokio::test]
async fn test_spawn_failure_aborts_launch() {
    let spawner = Arc::new(RecordingSpawner::failing_on(&[8082]));
    let windows = Arc::new(FakeWindows::with_titles(8080..8090));
    let launcher = launcher(
        spawner.clone(),
        windows,
        TileGrid::default(),
        SpawnFailurePolicy::Abort,
    );

    let err = launcher
        .launch(&Preset::Small.topology().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, LaunchError::Spawn { port: 8082, .. }));
    assert_eq!(spawner.spawned_ports(), vec![8080, 8081]);
}

/// The fixed settle interval is applied once per spawned node
#[tokio::test(start_paused = true)]
async fn test_fixed_settle_per_node() {
    let spawner = Arc::new(RecordingSpawner::default());
    let launcher = TopologyLauncher::new(
        spawner.clone(),
        None,
        ReadinessConfig::Fixed {
            settle: Duration::from_secs(1),
        },
        SpawnFailurePolicy::Skip,
    );

    let started = tokio::time::Instant::now();
    let summary = launcher.launch(&Preset::Small.topology().unwrap()).await.unwrap();

    assert_eq!(summary.launched.len(), 6);
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert!(summary.unplaced.is_empty());
}
