//! Cluster topology declarations
//!
//! A topology is an ordered list of [`NodeSpec`]s forming a forest: roots have
//! no parent, and every other node points at a port declared earlier in the
//! list. The only way to obtain a [`Topology`] is through validation, so the
//! launcher never sees a forward reference, a cycle or a duplicate port.
//!
//! # Example
//!
//! ```rust
//! use kvmesh_core::topology::{NodeSpec, Topology};
//!
//! let topology = Topology::new(vec![
//!     NodeSpec::root(8080),
//!     NodeSpec::child(8081, 8080),
//!     NodeSpec::child(8082, 8081),
//! ])
//! .unwrap();
//!
//! assert_eq!(topology.roots().count(), 1);
//! assert_eq!(topology.depth_of(8082), Some(2));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::TopologyError;

/// Launch parameters for one cluster member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Listening port of the node
    pub port: u16,
    /// Port of the node this one joins through (None = root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_port: Option<u16>,
}

impl NodeSpec {
    /// A node with no parent
    pub fn root(port: u16) -> Self {
        Self {
            port,
            parent_port: None,
        }
    }

    /// A node that joins the cluster through `parent`
    pub fn child(port: u16, parent: u16) -> Self {
        Self {
            port,
            parent_port: Some(parent),
        }
    }

    /// Whether this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent_port.is_none()
    }

    /// Title of the console window that hosts this node
    pub fn window_title(&self) -> String {
        self.port.to_string()
    }
}

impl fmt::Display for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent_port {
            Some(parent) => write!(f, "{}:{}", self.port, parent),
            None => write!(f, "{}", self.port),
        }
    }
}

/// Parses the `PORT` or `PORT:PARENT` shorthand
impl FromStr for NodeSpec {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TopologyError::InvalidNodeSpec {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.trim().splitn(2, ':');
        let port = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("missing port"))?
            .parse::<u16>()
            .map_err(|e| invalid(&format!("bad port: {e}")))?;

        let parent_port = match parts.next() {
            Some(parent) => Some(
                parent
                    .parse::<u16>()
                    .map_err(|e| invalid(&format!("bad parent port: {e}")))?,
            ),
            None => None,
        };

        Ok(Self { port, parent_port })
    }
}

/// A validated, non-empty cluster topology in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NodeSpec>", into = "Vec<NodeSpec>")]
pub struct Topology {
    nodes: Vec<NodeSpec>,
}

impl Topology {
    /// Validate a declaration and wrap it
    pub fn new(nodes: Vec<NodeSpec>) -> Result<Self, TopologyError> {
        validate(&nodes)?;
        Ok(Self { nodes })
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    /// Number of declared nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a validated topology
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All declared ports in declaration order
    pub fn ports(&self) -> Vec<u16> {
        self.nodes.iter().map(|n| n.port).collect()
    }

    /// Nodes without a parent
    pub fn roots(&self) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.iter().filter(|n| n.is_root())
    }

    /// Direct children of `port`, in declaration order
    pub fn children_of(&self, port: u16) -> impl Iterator<Item = &NodeSpec> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_port == Some(port))
    }

    /// Look up a node by port
    pub fn get(&self, port: u16) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.port == port)
    }

    /// Number of edges between `port` and its root
    pub fn depth_of(&self, port: u16) -> Option<usize> {
        let mut node = self.get(port)?;
        let mut depth = 0;
        // Terminates: validation rules out cycles
        while let Some(parent) = node.parent_port {
            node = self.get(parent)?;
            depth += 1;
        }
        Some(depth)
    }
}

impl TryFrom<Vec<NodeSpec>> for Topology {
    type Error = TopologyError;

    fn try_from(nodes: Vec<NodeSpec>) -> Result<Self, Self::Error> {
        Self::new(nodes)
    }
}

impl From<Topology> for Vec<NodeSpec> {
    fn from(topology: Topology) -> Self {
        topology.nodes
    }
}

/// Check a declaration without taking ownership
pub fn validate(nodes: &[NodeSpec]) -> Result<(), TopologyError> {
    if nodes.is_empty() {
        return Err(TopologyError::Empty);
    }

    let mut seen = HashSet::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        if node.port == 0 {
            return Err(TopologyError::ZeroPort { index });
        }
        if !seen.insert(node.port) {
            return Err(TopologyError::DuplicatePort { port: node.port });
        }

        let Some(parent) = node.parent_port else {
            continue;
        };

        if parent == node.port {
            return Err(TopologyError::SelfParent { port: node.port });
        }
        if !seen.contains(&parent) {
            let declared_later = nodes[index + 1..].iter().any(|n| n.port == parent);
            return Err(if declared_later {
                TopologyError::ParentDeclaredLater {
                    port: node.port,
                    parent,
                }
            } else {
                TopologyError::UnknownParent {
                    port: node.port,
                    parent,
                }
            });
        }
    }

    Ok(())
}
