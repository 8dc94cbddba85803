//! Starting store nodes in their own console windows

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::process::Stdio;
use tokio::process::Command;

use kvmesh_core::{CommandTemplate, NodeSpec};

use crate::error::{LaunchError, Result};

/// A freshly started node process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    /// Title of the console window, used to find it again
    pub window_title: String,
    /// When the spawn call returned
    pub spawn_time: DateTime<Utc>,
    /// OS process id of the console wrapper, if known
    pub pid: Option<u32>,
}

impl ProcessHandle {
    pub fn new(window_title: impl Into<String>) -> Self {
        Self {
            window_title: window_title.into(),
            spawn_time: Utc::now(),
            pid: None,
        }
    }
}

/// Starts a detached node process with a visible console
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Start `node`; returns once the process exists, not once it is ready
    async fn spawn(&self, node: &NodeSpec) -> Result<ProcessHandle>;
}

/// Spawns nodes through a terminal emulator or console host
#[derive(Debug, Clone)]
pub struct ConsoleSpawner {
    node_command: CommandTemplate,
    console: CommandTemplate,
}

impl ConsoleSpawner {
    pub fn new(node_command: CommandTemplate, console: CommandTemplate) -> Self {
        Self {
            node_command,
            console,
        }
    }

    /// Program and full argument list used to start `node`
    pub fn command_line(&self, node: &NodeSpec) -> (String, Vec<String>) {
        let mut args = self.console.render_args(&node.window_title());
        args.push(self.node_command.program.clone());
        args.extend(self.node_command.args.iter().cloned());
        args.push(node.port.to_string());
        if let Some(parent) = node.parent_port {
            args.push(parent.to_string());
        }
        (self.console.program.clone(), args)
    }
}

#[async_trait]
impl ProcessSpawner for ConsoleSpawner {
    async fn spawn(&self, node: &NodeSpec) -> Result<ProcessHandle> {
        let (program, args) = self.command_line(node);
        tracing::debug!(port = node.port, program = %program, args = ?args, "Spawning node");

        let mut command = Command::new(&program);
        push_args(&mut command, &args);

        // The child is dropped without kill_on_drop, so it outlives the launcher
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                port: node.port,
                reason: format!("{program}: {e}"),
            })?;

        Ok(ProcessHandle {
            window_title: node.window_title(),
            spawn_time: Utc::now(),
            pid: child.id(),
        })
    }
}

/// Append `args`, passing pre-quoted ones through untouched on Windows
fn push_args(command: &mut Command, args: &[String]) {
    for arg in args {
        #[cfg(windows)]
        if is_pre_quoted(arg) {
            command.raw_arg(arg);
            continue;
        }
        command.arg(arg);
    }
}

/// An argument that carries its own surrounding double quotes
#[cfg_attr(not(windows), allow(dead_code))]
fn is_pre_quoted(arg: &str) -> bool {
    arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"')
}
