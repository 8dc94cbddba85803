//! Window manager access

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{LaunchError, Result};

/// Window manager handle for one window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowId(pub String);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The subset of window manager operations the tiler needs
#[async_trait]
pub trait WindowManager: Send + Sync {
    /// Find a window by title; `None` when nothing matches
    async fn find_window(&self, title: &str) -> Result<Option<WindowId>>;

    /// Move the window's top-left corner
    async fn move_window(&self, id: &WindowId, x: u32, y: u32) -> Result<()>;

    /// Resize the window
    async fn resize_window(&self, id: &WindowId, width: u32, height: u32) -> Result<()>;
}

/// Window manager backed by the `wmctrl` command
#[derive(Debug, Clone)]
pub struct WmctrlWindowManager {
    program: String,
}

impl Default for WmctrlWindowManager {
    fn default() -> Self {
        Self {
            program: "wmctrl".to_string(),
        }
    }
}

impl WmctrlWindowManager {
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| LaunchError::Window(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(LaunchError::Window(format!(
                "{} {} exited with {}: {}",
                self.program,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn set_geometry(&self, id: &WindowId, geometry: String) -> Result<()> {
        self.run(&["-i", "-r", &id.0, "-e", &geometry]).await.map(|_| ())
    }
}

#[async_trait]
impl WindowManager for WmctrlWindowManager {
    async fn find_window(&self, title: &str) -> Result<Option<WindowId>> {
        let listing = self.run(&["-l"]).await?;
        Ok(find_in_listing(&listing, title))
    }

    async fn move_window(&self, id: &WindowId, x: u32, y: u32) -> Result<()> {
        self.set_geometry(id, format!("0,{x},{y},-1,-1")).await
    }

    async fn resize_window(&self, id: &WindowId, width: u32, height: u32) -> Result<()> {
        self.set_geometry(id, format!("0,-1,-1,{width},{height}")).await
    }
}

/// Pick a window out of `wmctrl -l` output
///
/// Lines look like `0x03a00003  0 host title words`. An exact title match
/// wins; otherwise the first title containing `title` is used.
pub fn find_in_listing(listing: &str, title: &str) -> Option<WindowId> {
    let windows: Vec<(&str, &str)> = listing
        .lines()
        .filter_map(|line| {
            let (id, title) = split_listing_line(line)?;
            (!title.is_empty()).then_some((id, title))
        })
        .collect();

    windows
        .iter()
        .find(|(_, name)| *name == title)
        .or_else(|| windows.iter().find(|(_, name)| name.contains(title)))
        .map(|(id, _)| WindowId(id.to_string()))
}

/// Split one listing line into window id and title, keeping the title's spacing
fn split_listing_line(line: &str) -> Option<(&str, &str)> {
    let mut rest = line;
    let mut id = "";
    // id, desktop, host
    for field in 0..3 {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        if field == 0 {
            id = &rest[..end];
        }
        rest = &rest[end..];
    }
    Some((id, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
0x01e00006  0 devbox Terminal - 18080
0x03a00003  0 devbox 8080
0x03c00003 -1 devbox
0x03e00003  0 devbox node 8081 (logs)
";

    #[test]
    fn test_exact_title_wins() {
        assert_eq!(
            find_in_listing(LISTING, "8080"),
            Some(WindowId("0x03a00003".into()))
        );
    }

    #[test]
    fn test_substring_fallback() {
        assert_eq!(
            find_in_listing(LISTING, "8081"),
            Some(WindowId("0x03e00003".into()))
        );
    }

    #[test]
    fn test_missing_window() {
        assert_eq!(find_in_listing(LISTING, "8099"), None);
        assert_eq!(find_in_listing("", "8080"), None);
    }
}
