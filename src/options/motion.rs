use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Largest accepted per-column stagger step, in seconds.
pub const MAX_STAGGER_STEP_SECS: f32 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Scroll reveal timing and observation parameters.
pub struct RevealOptions {
    /// Extra transition delay per grid column, in seconds.
    pub stagger_step_secs: f32,
    /// Fraction of an element that must be inside the observation root
    /// before it is revealed.
    pub observer_threshold: f32,
    /// Pixels trimmed off the bottom of the viewport for observation, so
    /// elements reveal slightly after they scroll into view.
    pub observer_bottom_margin_px: f32,
}

impl RevealOptions {
    /// Stagger step as a duration. Values that are not a valid duration
    /// fall back to the default step.
    #[must_use]
    pub fn stagger_step(&self) -> Duration {
        Duration::try_from_secs_f32(self.stagger_step_secs).unwrap_or_else(|_| {
            Duration::from_secs_f32(Self::default().stagger_step_secs)
        })
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            stagger_step_secs: 0.1,
            observer_threshold: 0.1,
            observer_bottom_margin_px: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Category filter transition timing.
pub struct FilterOptions {
    /// Length of the card fade/scale transition, in milliseconds. Display
    /// updates land after one window, the change signal after two.
    pub transition_ms: u64,
}

impl FilterOptions {
    /// Transition window as a duration.
    #[must_use]
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self { transition_ms: 300 }
    }
}
