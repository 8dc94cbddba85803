//! Benchmark workload types

use serde::{Deserialize, Serialize};
use std::fmt;

/// One key/value pair exercised by the benchmark
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadItem {
    pub key: String,
    pub value: String,
}

impl WorkloadItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Store operations issued for every workload item, in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Post,
    Get,
    Delete,
}

impl Operation {
    /// The fixed per-key sequence
    pub const SEQUENCE: [Operation; 3] = [Operation::Post, Operation::Get, Operation::Delete];

    /// HTTP method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Post => "POST",
            Operation::Get => "GET",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total calls a workload of `items` entries issues
pub fn total_requests(items: usize) -> usize {
    items * Operation::SEQUENCE.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_order() {
        let names: Vec<&str> = Operation::SEQUENCE.iter().map(Operation::as_str).collect();
        assert_eq!(names, vec!["POST", "GET", "DELETE"]);
        assert_eq!(total_requests(7), 21);
    }

    #[test]
    fn test_operation_serialization() {
        assert_eq!(serde_json::to_string(&Operation::Delete).unwrap(), "\"DELETE\"");
    }
}
