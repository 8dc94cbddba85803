//! Configuration types for launching clusters and running benchmarks
//!
//! Both configurations load from JSON files. Every field has a default, so a
//! file only needs to name what it changes. Durations are written as
//! human-readable strings such as `"1s"` or `"250ms"`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::presets;
use crate::tiling::TileGrid;
use crate::workload::WorkloadItem;

/// Placeholder replaced with the window title in console arguments
pub const TITLE_PLACEHOLDER: &str = "{title}";

/// Placeholder replaced with the window title wrapped in double quotes
///
/// `start` only reads its first argument as a title when it is quoted, and
/// the quotes must reach the command line verbatim.
pub const QUOTED_TITLE_PLACEHOLDER: &str = "{quoted_title}";

/// Read and deserialize a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Program plus leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `xterm` window that stays open after the node exits
    pub fn xterm() -> Self {
        Self::new("xterm", &["-T", TITLE_PLACEHOLDER, "-hold", "-e"])
    }

    /// New `cmd` window through `start`, kept open with `/K`
    pub fn windows_start() -> Self {
        Self::new("cmd", &["/c", "start", QUOTED_TITLE_PLACEHOLDER, "cmd", "/K"])
    }

    /// Arguments with every title placeholder substituted
    pub fn render_args(&self, title: &str) -> Vec<String> {
        let quoted = format!("\"{title}\"");
        self.args
            .iter()
            .map(|arg| {
                arg.replace(QUOTED_TITLE_PLACEHOLDER, &quoted)
                    .replace(TITLE_PLACEHOLDER, title)
            })
            .collect()
    }
}

/// How the launcher decides a freshly spawned node is up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReadinessConfig {
    /// Sleep a fixed interval after each spawn
    Fixed {
        #[serde(with = "humantime_serde")]
        settle: Duration,
    },
    /// Poll the node's port until it accepts a connection
    Probe {
        #[serde(with = "humantime_serde")]
        timeout: Duration,
        #[serde(with = "humantime_serde")]
        initial_backoff: Duration,
        #[serde(with = "humantime_serde")]
        max_backoff: Duration,
    },
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        ReadinessConfig::Probe {
            timeout: Duration::from_secs(10),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(1),
        }
    }
}

/// Retry policy for finding a node's window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLookupConfig {
    /// Lookups before giving up (at least 1)
    pub attempts: u32,
    /// Pause between lookups
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for WindowLookupConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_millis(200),
        }
    }
}

/// What the launcher does when a node fails to spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnFailurePolicy {
    /// Log it, skip the node and its descendants, keep going
    #[default]
    Skip,
    /// Stop the launch; nodes already running are left running
    Abort,
}

/// Window manager backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowBackend {
    /// `wmctrl` on X11 desktops
    Wmctrl,
    /// Do not touch windows
    Disabled,
}

impl Default for WindowBackend {
    /// `wmctrl` where it can exist; there is no Windows backend yet
    fn default() -> Self {
        if cfg!(windows) {
            WindowBackend::Disabled
        } else {
            WindowBackend::Wmctrl
        }
    }
}

/// Cluster launch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Store node executable; port and parent port are appended
    pub node_command: CommandTemplate,
    /// Console wrapper; the node command is appended after these arguments
    pub console: CommandTemplate,
    /// Window grid
    pub tiles: TileGrid,
    /// Readiness strategy after each spawn
    pub readiness: ReadinessConfig,
    /// Window lookup retries
    pub window_lookup: WindowLookupConfig,
    /// Spawn failure handling
    pub on_spawn_failure: SpawnFailurePolicy,
    /// Window manager backend
    pub window_backend: WindowBackend,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        let console = if cfg!(windows) {
            CommandTemplate::windows_start()
        } else {
            CommandTemplate::xterm()
        };

        Self {
            node_command: CommandTemplate::new("node", &["process/index.js"]),
            console,
            tiles: TileGrid::default(),
            readiness: ReadinessConfig::default(),
            window_lookup: WindowLookupConfig::default(),
            on_spawn_failure: SpawnFailurePolicy::default(),
            window_backend: WindowBackend::default(),
        }
    }
}

impl LaunchConfig {
    /// Load and validate a launch configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.node_command.program.trim().is_empty() {
            return Err(ConfigError::Invalid("node_command.program is empty".into()));
        }
        if self.console.program.trim().is_empty() {
            return Err(ConfigError::Invalid("console.program is empty".into()));
        }
        if self.tiles.tile_width == 0 || self.tiles.tile_height == 0 {
            return Err(ConfigError::Invalid("tile dimensions must be non-zero".into()));
        }
        if self.tiles.screen_width == 0 || self.tiles.screen_height == 0 {
            return Err(ConfigError::Invalid("screen dimensions must be non-zero".into()));
        }
        if self.window_lookup.attempts == 0 {
            return Err(ConfigError::Invalid("window_lookup.attempts must be at least 1".into()));
        }
        if let ReadinessConfig::Probe {
            initial_backoff,
            max_backoff,
            ..
        } = self.readiness
        {
            if initial_backoff.is_zero() || max_backoff < initial_backoff {
                return Err(ConfigError::Invalid(
                    "probe backoff must be non-zero and max_backoff >= initial_backoff".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Benchmark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Key/value pairs, exercised in order
    pub workload: Vec<WorkloadItem>,
    /// Candidate node ports; every call picks one uniformly
    pub ports: Vec<u16>,
    /// Host the nodes listen on
    pub host: String,
    /// Pause after every call
    #[serde(with = "humantime_serde")]
    pub pacing: Duration,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Seed for port selection (None = entropy)
    pub seed: Option<u64>,
    /// Report file
    pub output: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workload: presets::default_workload(),
            ports: presets::default_ports(),
            host: "localhost".to_string(),
            pacing: Duration::ZERO,
            request_timeout: Duration::from_secs(10),
            seed: None,
            output: PathBuf::from("results.json"),
        }
    }
}

impl BenchConfig {
    /// Load and validate a benchmark configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.ports.is_empty() {
            return Err(ConfigError::Invalid("no candidate ports".into()));
        }
        if self.ports.contains(&0) {
            return Err(ConfigError::Invalid("port 0 is not a valid candidate".into()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host is empty".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("request_timeout must be non-zero".into()));
        }
        if let Some(index) = self.workload.iter().position(|item| item.key.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "workload item {index} has an empty key"
            )));
        }
        Ok(())
    }
}

// Helper module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
