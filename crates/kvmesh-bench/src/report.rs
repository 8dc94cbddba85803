//! Per-request records and the persisted benchmark report

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use kvmesh_core::{LatencyDistribution, Operation};

use crate::error::{BenchError, Result};

/// Body text of the synthetic response recorded for transport failures
pub const TRANSPORT_ERROR_LABEL: &str = "Invalid response";

/// Captured response text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Set only for requests that never got an HTTP response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub text: String,
}

impl ResponseBody {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            error: None,
            text: text.into(),
        }
    }

    /// Synthetic body standing in for a response that never arrived
    pub fn transport_error(detail: impl Into<String>) -> Self {
        Self {
            error: Some(TRANSPORT_ERROR_LABEL.to_string()),
            text: detail.into(),
        }
    }
}

/// One issued call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub operation: Operation,
    pub key: String,
    pub target_port: u16,
    pub latency_seconds: f64,
    /// None when the call failed below HTTP
    pub status_code: Option<u16>,
    pub response: ResponseBody,
}

impl RequestRecord {
    /// Only a 200 counts as success
    pub fn is_success(&self) -> bool {
        self.status_code == Some(200)
    }
}

/// POST, GET and DELETE outcomes for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    pub key: String,

    #[serde(rename = "POST Port")]
    pub post_port: u16,
    #[serde(rename = "POST Status")]
    pub post_status: Option<u16>,
    #[serde(rename = "POST Response")]
    pub post_response: ResponseBody,
    #[serde(rename = "POST Latency")]
    pub post_latency: f64,

    #[serde(rename = "GET Port")]
    pub get_port: u16,
    #[serde(rename = "GET Status")]
    pub get_status: Option<u16>,
    #[serde(rename = "GET Response")]
    pub get_response: ResponseBody,
    #[serde(rename = "GET Latency")]
    pub get_latency: f64,

    #[serde(rename = "DELETE Port")]
    pub delete_port: u16,
    #[serde(rename = "DELETE Status")]
    pub delete_status: Option<u16>,
    #[serde(rename = "DELETE Response")]
    pub delete_response: ResponseBody,
    #[serde(rename = "DELETE Latency")]
    pub delete_latency: f64,
}

impl KeyResult {
    /// Merge the three records of one key, given in issue order
    pub fn from_records([post, get, delete]: [RequestRecord; 3]) -> Self {
        debug_assert_eq!(post.operation, Operation::Post);
        debug_assert_eq!(get.operation, Operation::Get);
        debug_assert_eq!(delete.operation, Operation::Delete);

        Self {
            key: post.key,
            post_port: post.target_port,
            post_status: post.status_code,
            post_response: post.response,
            post_latency: post.latency_seconds,
            get_port: get.target_port,
            get_status: get.status_code,
            get_response: get.response,
            get_latency: get.latency_seconds,
            delete_port: delete.target_port,
            delete_status: delete.status_code,
            delete_response: delete.response,
            delete_latency: delete.latency_seconds,
        }
    }

    /// Destination ports in issue order
    pub fn ports(&self) -> [u16; 3] {
        [self.post_port, self.get_port, self.delete_port]
    }
}

/// Aggregate statistics of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(rename = "Total requests")]
    pub total_requests: usize,
    #[serde(rename = "Successful requests")]
    pub successful_requests: usize,
    #[serde(rename = "Failed requests")]
    pub failed_requests: usize,
    #[serde(rename = "Total elapsed time")]
    pub elapsed_seconds: f64,
    #[serde(rename = "Throughput")]
    pub throughput: f64,
    #[serde(rename = "Success rate")]
    pub success_rate: f64,
    #[serde(rename = "Error rate")]
    pub error_rate: f64,
    /// None when no request was issued
    #[serde(rename = "Response Time Distribution")]
    pub response_times: Option<LatencyDistribution>,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub results: Vec<KeyResult>,
    pub performance_metrics: PerformanceMetrics,
}

impl BenchmarkReport {
    /// Pretty JSON with four-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the report to `path`, replacing any existing file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json + "\n").map_err(|source| BenchError::ReportWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fail early if a report could not be written to `path`
pub fn check_output_path(path: &Path) -> Result<()> {
    let unusable = |reason: &str| BenchError::OutputPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if path.as_os_str().is_empty() {
        return Err(unusable("path is empty"));
    }
    if path.is_dir() {
        return Err(unusable("path is a directory"));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(unusable("parent directory does not exist"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(operation: Operation, port: u16, status: Option<u16>) -> RequestRecord {
        RequestRecord {
            operation,
            key: "A".into(),
            target_port: port,
            latency_seconds: 0.01,
            status_code: status,
            response: match status {
                Some(_) => ResponseBody::text("ok"),
                None => ResponseBody::transport_error("connection refused"),
            },
        }
    }

    #[test]
    fn test_key_result_json_keys() {
        let result = KeyResult::from_records([
            record(Operation::Post, 8080, Some(200)),
            record(Operation::Get, 8081, Some(404)),
            record(Operation::Delete, 8082, None),
        ]);
        assert_eq!(result.ports(), [8080, 8081, 8082]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["key"], "A");
        assert_eq!(json["POST Response"]["text"], "ok");
        assert!(json["POST Response"].get("error").is_none());
        assert_eq!(json["GET Status"], 404);
        assert!(json["DELETE Status"].is_null());
        assert_eq!(json["DELETE Response"]["error"], "Invalid response");
        assert_eq!(json["DELETE Response"]["text"], "connection refused");
        assert!(json["DELETE Latency"].is_number());
    }

    #[test]
    fn test_success_classification() {
        assert!(record(Operation::Get, 1, Some(200)).is_success());
        assert!(!record(Operation::Get, 1, Some(201)).is_success());
        assert!(!record(Operation::Get, 1, Some(500)).is_success());
        assert!(!record(Operation::Get, 1, None).is_success());
    }

    #[test]
    fn test_report_uses_four_space_indent() {
        let report = BenchmarkReport {
            results: vec![],
            performance_metrics: PerformanceMetrics {
                total_requests: 0,
                successful_requests: 0,
                failed_requests: 0,
                elapsed_seconds: 0.0,
                throughput: 0.0,
                success_rate: 0.0,
                error_rate: 0.0,
                response_times: None,
            },
        };

        let json = report.to_json().unwrap();
        assert!(json.contains("\n    \"performance_metrics\""));
        assert!(json.contains("\"Response Time Distribution\": null"));
    }

    #[test]
    fn test_check_output_path() {
        let dir = tempfile::tempdir().unwrap();

        assert!(check_output_path(&dir.path().join("results.json")).is_ok());
        assert!(check_output_path(Path::new("results.json")).is_ok());

        let err = check_output_path(dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "OUTPUT_PATH");

        let err = check_output_path(&dir.path().join("missing").join("results.json")).unwrap_err();
        assert!(err.to_string().contains("parent directory"));
    }
}
