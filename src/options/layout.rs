use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Responsive grid breakpoints and resize handling.
pub struct LayoutOptions {
    /// Viewport width at which the grid switches to two columns.
    pub tablet_min_width: f32,
    /// Viewport width at which the grid switches to three columns.
    pub desktop_min_width: f32,
    /// Trailing-edge debounce window for resize handling, in milliseconds.
    pub resize_debounce_ms: u64,
}

impl LayoutOptions {
    /// Grid column count for a viewport `width`: 1, 2 or 3.
    #[must_use]
    pub fn column_count(&self, width: f32) -> usize {
        if width >= self.desktop_min_width {
            3
        } else if width >= self.tablet_min_width {
            2
        } else {
            1
        }
    }

    /// Resize debounce window.
    #[must_use]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            tablet_min_width: 768.0,
            desktop_min_width: 1024.0,
            resize_debounce_ms: 150,
        }
    }
}
