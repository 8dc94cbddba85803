//! Grid placement for node console windows
//!
//! Tiles are packed left to right, top to bottom. Once the grid runs out of
//! rows the positions keep extending below the visible screen; callers that
//! launch more than [`TileGrid::capacity`] windows get overlapping-free but
//! off-screen tiles.

use serde::{Deserialize, Serialize};

/// Position and size of one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSlot {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fixed tile dimensions on a fixed screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Width of every tile in pixels
    pub tile_width: u32,
    /// Height of every tile in pixels
    pub tile_height: u32,
    /// Screen width in pixels
    pub screen_width: u32,
    /// Screen height in pixels
    pub screen_height: u32,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            tile_width: 350,
            tile_height: 200,
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

impl TileGrid {
    /// Create a grid
    pub fn new(tile_width: u32, tile_height: u32, screen_width: u32, screen_height: u32) -> Self {
        Self {
            tile_width,
            tile_height,
            screen_width,
            screen_height,
        }
    }

    /// Tiles per row; at least one even when a tile is wider than the screen
    pub fn columns(&self) -> u32 {
        (self.screen_width / self.tile_width.max(1)).max(1)
    }

    /// Rows that fit entirely on screen
    pub fn rows(&self) -> u32 {
        self.screen_height / self.tile_height.max(1)
    }

    /// Number of tiles that fit on screen without overlap
    pub fn capacity(&self) -> u32 {
        self.columns().saturating_mul(self.rows())
    }

    /// Slot for the `index`-th window
    pub fn slot(&self, index: u32) -> WindowSlot {
        let cols = self.columns();
        WindowSlot {
            x: (index % cols).saturating_mul(self.tile_width),
            // Clamped to the far edge for indices past any real screen
            y: (index / cols).saturating_mul(self.tile_height),
            width: self.tile_width,
            height: self.tile_height,
        }
    }

    /// Whether the `index`-th slot lies fully on screen
    pub fn is_on_screen(&self, index: u32) -> bool {
        index < self.capacity()
    }
}
