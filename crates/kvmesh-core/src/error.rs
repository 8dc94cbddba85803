//! Error types for topology declarations and configuration files

use std::path::PathBuf;
use thiserror::Error;

/// A topology declaration that cannot be launched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// No nodes were declared
    #[error("Topology declares no nodes")]
    Empty,

    /// Port zero is not a listening port
    #[error("Node at position {index} has port 0")]
    ZeroPort { index: usize },

    /// The same port was declared twice
    #[error("Port {port} is declared more than once")]
    DuplicatePort { port: u16 },

    /// A node names itself as its parent
    #[error("Node {port} cannot be its own parent")]
    SelfParent { port: u16 },

    /// The parent port does not appear anywhere in the declaration
    #[error("Node {port} references parent {parent}, which is never declared")]
    UnknownParent { port: u16, parent: u16 },

    /// The parent port is declared, but only after the child
    #[error("Node {port} references parent {parent}, which is declared later")]
    ParentDeclaredLater { port: u16, parent: u16 },

    /// A `PORT[:PARENT]` shorthand could not be parsed
    #[error("Invalid node spec '{input}': {reason}")]
    InvalidNodeSpec { input: String, reason: String },
}

impl TopologyError {
    /// Get an error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            TopologyError::Empty => "TOPOLOGY_EMPTY",
            TopologyError::ZeroPort { .. } => "TOPOLOGY_ZERO_PORT",
            TopologyError::DuplicatePort { .. } => "TOPOLOGY_DUPLICATE_PORT",
            TopologyError::SelfParent { .. } => "TOPOLOGY_SELF_PARENT",
            TopologyError::UnknownParent { .. } => "TOPOLOGY_UNKNOWN_PARENT",
            TopologyError::ParentDeclaredLater { .. } => "TOPOLOGY_FORWARD_REFERENCE",
            TopologyError::InvalidNodeSpec { .. } => "TOPOLOGY_INVALID_NODE_SPEC",
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected shape
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Embedded topology is malformed
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl ConfigError {
    /// Get an error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "CONFIG_IO",
            ConfigError::Parse { .. } => "CONFIG_PARSE",
            ConfigError::Invalid(_) => "CONFIG_INVALID",
            ConfigError::Topology(err) => err.error_code(),
        }
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
