//! Per-card interpolated pointer offset.

use glam::Vec2;

use crate::dom::Rect;
use crate::options::ParallaxOptions;
use crate::scheduler::TaskHandle;

/// Interpolation constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxTuning {
    /// Offset at the card edge, in pixels.
    pub max_offset: f32,
    /// Fraction of the remaining distance covered per step.
    pub blend: f32,
    /// Per-axis distance below which the offset snaps to the target.
    pub epsilon: f32,
}

impl ParallaxTuning {
    /// Tuning from site options.
    #[must_use]
    pub fn from_options(options: &ParallaxOptions) -> Self {
        Self {
            max_offset: options.max_offset_px,
            blend: options.blend,
            epsilon: options.epsilon_px,
        }
    }

    /// Target offset for a pointer at `pointer` (viewport coordinates)
    /// over a card at `rect`: proportional to the pointer's displacement
    /// from the card center and pointing the opposite way.
    #[must_use]
    pub fn target_for(&self, pointer: Vec2, rect: &Rect) -> Vec2 {
        let half = Vec2::new(rect.width, rect.height) * 0.5;
        if half.x <= 0.0 || half.y <= 0.0 {
            return Vec2::ZERO;
        }
        let normalized = ((pointer - rect.center()) / half)
            .clamp(Vec2::splat(-1.0), Vec2::ONE);
        -normalized * self.max_offset
    }
}

impl Default for ParallaxTuning {
    fn default() -> Self {
        Self::from_options(&ParallaxOptions::default())
    }
}

/// Whether a session has an interpolation step scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Converged; nothing scheduled.
    Idle,
    /// A step is scheduled for the next frame.
    Interpolating(TaskHandle),
}

/// Hover state of one card, alive from pointer-enter to pointer-leave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxSession {
    /// Where the offset is heading.
    pub target: Vec2,
    /// Offset currently applied.
    pub current: Vec2,
    /// Scheduling state.
    pub phase: SessionPhase,
}

impl ParallaxSession {
    /// Session at rest at the neutral offset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            target: Vec2::ZERO,
            current: Vec2::ZERO,
            phase: SessionPhase::Idle,
        }
    }

    /// Scheduled step, if any.
    #[must_use]
    pub fn pending(&self) -> Option<TaskHandle> {
        match self.phase {
            SessionPhase::Idle => None,
            SessionPhase::Interpolating(handle) => Some(handle),
        }
    }

    /// Move `current` toward `target` by the blend fraction. Returns
    /// whether another step is needed; when not, `current` has snapped
    /// exactly onto `target`.
    pub fn step(&mut self, tuning: &ParallaxTuning) -> bool {
        self.current += (self.target - self.current) * tuning.blend;
        let remaining = (self.target - self.current).abs();
        if remaining.max_element() > tuning.epsilon {
            true
        } else {
            self.current = self.target;
            false
        }
    }
}

impl Default for ParallaxSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_inverted_and_scaled() {
        let tuning = ParallaxTuning::default();
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);

        assert_eq!(tuning.target_for(rect.center(), &rect), Vec2::ZERO);
        // Bottom-right corner pushes the image up-left.
        assert_eq!(
            tuning.target_for(Vec2::new(300.0, 200.0), &rect),
            Vec2::new(-5.0, -5.0)
        );
        // Halfway to the left edge.
        assert_eq!(
            tuning.target_for(Vec2::new(150.0, 150.0), &rect),
            Vec2::new(2.5, 0.0)
        );
        // Outside the card is clamped to the edge value.
        assert_eq!(
            tuning.target_for(Vec2::new(1000.0, 150.0), &rect),
            Vec2::new(-5.0, 0.0)
        );
    }

    #[test]
    fn degenerate_card_has_no_offset() {
        let tuning = ParallaxTuning::default();
        let rect = Rect::new(0.0, 0.0, 0.0, 50.0);
        assert_eq!(tuning.target_for(Vec2::new(10.0, 10.0), &rect), Vec2::ZERO);
    }

    #[test]
    fn converges_geometrically() {
        let tuning = ParallaxTuning::default();
        let mut session = ParallaxSession::new();
        session.target = Vec2::new(-5.0, -5.0);

        let mut last = session.target.distance(session.current);
        let mut steps = 0;
        while session.step(&tuning) {
            let now = session.target.distance(session.current);
            assert!(now < last, "distance must shrink every step");
            assert!((now / last - (1.0 - tuning.blend)).abs() < 1e-3);
            last = now;
            steps += 1;
            assert!(steps < 100, "did not converge");
        }
        assert_eq!(session.current, session.target);
        // 5 * 0.85^n <= 0.01 → n = ceil(ln(0.002) / ln(0.85)) = 39
        assert!((35..=40).contains(&steps), "took {steps} steps");
    }

    #[test]
    fn already_converged_snaps_immediately() {
        let tuning = ParallaxTuning::default();
        let mut session = ParallaxSession::new();
        session.target = Vec2::new(0.005, 0.0);
        assert!(!session.step(&tuning));
        assert_eq!(session.current, session.target);
    }
}
