//! Built-in cluster layouts and workload

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::topology::{NodeSpec, Topology};
use crate::workload::WorkloadItem;

/// First port of the built-in clusters
pub const BASE_PORT: u16 = 8080;

/// Built-in topology choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Six nodes on 8080-8085
    #[default]
    Small,
    /// Twenty nodes on 8080-8099
    Large,
}

/// (port, parent) pairs of the large layout; the small layout is its prefix
const LARGE_LAYOUT: [(u16, Option<u16>); 20] = [
    (8080, None),
    (8081, Some(8080)),
    (8082, Some(8080)),
    (8083, Some(8081)),
    (8084, Some(8080)),
    (8085, Some(8081)),
    (8086, Some(8081)),
    (8087, Some(8081)),
    (8088, Some(8081)),
    (8089, Some(8080)),
    (8090, Some(8082)),
    (8091, Some(8082)),
    (8092, Some(8081)),
    (8093, Some(8081)),
    (8094, Some(8080)),
    (8095, Some(8082)),
    (8096, Some(8082)),
    (8097, Some(8087)),
    (8098, Some(8087)),
    (8099, Some(8081)),
];

impl Preset {
    /// Node declarations of this preset
    pub fn nodes(&self) -> Vec<NodeSpec> {
        let count = match self {
            Preset::Small => 6,
            Preset::Large => LARGE_LAYOUT.len(),
        };
        LARGE_LAYOUT[..count]
            .iter()
            .map(|&(port, parent_port)| NodeSpec { port, parent_port })
            .collect()
    }

    /// Validated topology of this preset
    pub fn topology(&self) -> Result<Topology, TopologyError> {
        Topology::new(self.nodes())
    }
}

/// Keys A-G with values 1-7
pub fn default_workload() -> Vec<WorkloadItem> {
    ('A'..='G')
        .zip(1..)
        .map(|(key, value)| WorkloadItem::new(key.to_string(), value.to_string()))
        .collect()
}

/// Every port of the large preset
pub fn default_ports() -> Vec<u16> {
    (BASE_PORT..BASE_PORT + LARGE_LAYOUT.len() as u16).collect()
}
