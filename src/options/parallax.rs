use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Pointer parallax tuning for project cards.
pub struct ParallaxOptions {
    /// Largest image-layer offset in pixels, reached at the card edge.
    pub max_offset_px: f32,
    /// Fraction of the remaining distance covered per animation frame.
    pub blend: f32,
    /// Remaining distance (per axis) below which the offset snaps.
    pub epsilon_px: f32,
    /// Scale applied to the image layer while hovered, so the offset
    /// never exposes the card edge.
    pub image_scale: f32,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            max_offset_px: 5.0,
            blend: 0.15,
            epsilon_px: 0.01,
            image_scale: 1.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Mobile-only "flip the centered card" behavior.
pub struct FlipOptions {
    /// Time between flips, in milliseconds.
    pub interval_ms: u64,
    /// Widest viewport on which cards flip.
    pub mobile_max_width: f32,
}

impl FlipOptions {
    /// Flip interval as a duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for FlipOptions {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            mobile_max_width: 767.0,
        }
    }
}
