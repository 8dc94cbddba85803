//! Launcher error types

use kvmesh_core::{ConfigError, TopologyError};
use thiserror::Error;

/// Errors that can occur while launching a cluster
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The topology declaration is malformed; nothing was spawned
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),

    /// The launch configuration is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The OS refused to start a node process
    #[error("Failed to spawn node {port}: {reason}")]
    Spawn { port: u16, reason: String },

    /// The window manager command failed
    #[error("Window manager error: {0}")]
    Window(String),
}

impl LaunchError {
    /// Get an error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LaunchError::Topology(err) => err.error_code(),
            LaunchError::Config(err) => err.error_code(),
            LaunchError::Spawn { .. } => "SPAWN_FAILED",
            LaunchError::Window(_) => "WINDOW_MANAGER_FAILED",
        }
    }

    /// Whether the error was caught before any process was started
    pub fn is_validation_error(&self) -> bool {
        matches!(self, LaunchError::Topology(_) | LaunchError::Config(_))
    }
}

/// Result type for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;
