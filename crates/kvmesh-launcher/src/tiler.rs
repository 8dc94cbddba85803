//! Moves node console windows into a non-overlapping grid

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, warn};

use kvmesh_core::{TileGrid, WindowLookupConfig, WindowSlot};

use crate::error::Result;
use crate::window::{WindowId, WindowManager};

/// Outcome of placing one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The window was moved and resized into this slot
    Placed(WindowSlot),
    /// No window carried the title; nothing was moved
    NotFound,
}

/// Places windows on a [`TileGrid`]
pub struct WindowTiler {
    windows: Arc<dyn WindowManager>,
    grid: TileGrid,
    lookup: WindowLookupConfig,
}

impl WindowTiler {
    pub fn new(windows: Arc<dyn WindowManager>, grid: TileGrid, lookup: WindowLookupConfig) -> Self {
        Self {
            windows,
            grid,
            lookup,
        }
    }

    /// The grid windows are placed on
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Move the window titled `title` into slot `index`
    ///
    /// A missing window is reported as [`Placement::NotFound`], never as an
    /// error. Errors only come from the window manager itself failing.
    pub async fn place(&self, title: &str, index: u32) -> Result<Placement> {
        let Some(id) = self.find_with_retry(title).await? else {
            warn!(title, "Window not found, skipping placement");
            return Ok(Placement::NotFound);
        };

        let slot = self.grid.slot(index);
        if !self.grid.is_on_screen(index) {
            debug!(title, index, capacity = self.grid.capacity(), "Tile extends past the screen");
        }

        self.windows.move_window(&id, slot.x, slot.y).await?;
        self.windows
            .resize_window(&id, slot.width, slot.height)
            .await?;

        debug!(title, window = %id, x = slot.x, y = slot.y, "Placed window");
        Ok(Placement::Placed(slot))
    }

    async fn find_with_retry(&self, title: &str) -> Result<Option<WindowId>> {
        for attempt in 1..=self.lookup.attempts {
            if let Some(id) = self.windows.find_window(title).await? {
                return Ok(Some(id));
            }
            if attempt < self.lookup.attempts {
                sleep(self.lookup.interval).await;
            }
        }
        Ok(None)
    }
}
