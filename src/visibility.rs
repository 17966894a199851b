//! Viewport visibility: the "is it on screen right now" query and the
//! registration set standing in for the platform's intersection observer.

use crate::dom::{Dom, ElementId, Rect, Viewport};

/// Whether `rect` overlaps the viewport on both axes.
#[must_use]
pub fn rect_in_viewport(rect: &Rect, viewport: Viewport) -> bool {
    rect.top < viewport.height
        && rect.bottom() > 0.0
        && rect.left < viewport.width
        && rect.right() > 0.0
}

/// Whether `element` currently overlaps the viewport. One layout read.
pub fn is_in_viewport(dom: &dyn Dom, element: ElementId) -> bool {
    rect_in_viewport(&dom.bounding_rect(element), dom.viewport())
}

/// Observation root parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element's area that must be inside the root.
    pub threshold: f32,
    /// Pixels trimmed off the bottom of the viewport.
    pub bottom_margin: f32,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin: 50.0,
        }
    }
}

impl ObserverOptions {
    /// Whether `rect` intersects the observation root enough to count.
    ///
    /// Unrendered (zero-area) elements never intersect.
    #[must_use]
    pub fn intersects(&self, rect: &Rect, viewport: Viewport) -> bool {
        let root_bottom = (viewport.height - self.bottom_margin).max(0.0);
        let w = rect.right().min(viewport.width) - rect.left.max(0.0);
        let h = rect.bottom().min(root_bottom) - rect.top.max(0.0);
        if w <= 0.0 || h <= 0.0 {
            return false;
        }
        let area = rect.width * rect.height;
        area > 0.0 && (w * h) / area >= self.threshold
    }
}

/// Elements waiting to intersect the viewport, in registration order.
#[derive(Debug, Clone, Default)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    targets: Vec<ElementId>,
}

impl VisibilityObserver {
    /// Observer with no targets.
    #[must_use]
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
        }
    }

    /// Start watching `element`. Registering twice is a no-op.
    pub fn observe(&mut self, element: ElementId) {
        if !self.targets.contains(&element) {
            self.targets.push(element);
        }
    }

    /// Stop watching `element`; returns whether it was registered.
    pub fn unobserve(&mut self, element: ElementId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| *t != element);
        self.targets.len() != before
    }

    /// Drop every registration.
    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    /// Whether `element` is registered.
    #[must_use]
    pub fn is_observing(&self, element: ElementId) -> bool {
        self.targets.contains(&element)
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Registered elements that intersect the root right now.
    pub fn intersecting(&self, dom: &dyn Dom) -> Vec<ElementId> {
        let viewport = dom.viewport();
        self.targets
            .iter()
            .copied()
            .filter(|el| {
                self.options.intersects(&dom.bounding_rect(*el), viewport)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    const VIEW: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    #[test]
    fn overlap_requires_both_axes() {
        assert!(rect_in_viewport(&Rect::new(10.0, 10.0, 50.0, 50.0), VIEW));
        // Below the fold
        assert!(!rect_in_viewport(&Rect::new(10.0, 800.0, 50.0, 50.0), VIEW));
        // Scrolled past
        assert!(!rect_in_viewport(&Rect::new(10.0, -50.0, 50.0, 50.0), VIEW));
        // Off to the right
        assert!(!rect_in_viewport(
            &Rect::new(1000.0, 10.0, 50.0, 50.0),
            VIEW
        ));
        // Straddling the top edge
        assert!(rect_in_viewport(&Rect::new(10.0, -25.0, 50.0, 50.0), VIEW));
    }

    #[test]
    fn zero_rect_is_not_in_viewport() {
        assert!(!rect_in_viewport(&Rect::default(), VIEW));
    }

    #[test]
    fn threshold_and_margin() {
        let opts = ObserverOptions::default();
        // 100px tall, only 5px inside the trimmed root (750px): 5%.
        assert!(!opts.intersects(&Rect::new(0.0, 745.0, 100.0, 100.0), VIEW));
        // 20px inside: 20%.
        assert!(opts.intersects(&Rect::new(0.0, 730.0, 100.0, 100.0), VIEW));
        assert!(!opts.intersects(&Rect::default(), VIEW));
    }

    #[test]
    fn observe_is_deduplicated() {
        let mut obs = VisibilityObserver::default();
        obs.observe(ElementId(1));
        obs.observe(ElementId(1));
        assert_eq!(obs.len(), 1);
        assert!(obs.unobserve(ElementId(1)));
        assert!(!obs.unobserve(ElementId(1)));
        assert!(obs.is_empty());
    }

    #[test]
    fn intersecting_follows_scroll() {
        let mut dom = MemoryDom::new(VIEW);
        let near = dom.create(None, &["fade-up"]);
        let far = dom.create(None, &["fade-up"]);
        dom.set_rect(near, Rect::new(0.0, 900.0, 200.0, 200.0));
        dom.set_rect(far, Rect::new(0.0, 3000.0, 200.0, 200.0));

        let mut obs = VisibilityObserver::new(ObserverOptions::default());
        obs.observe(near);
        obs.observe(far);
        assert!(obs.intersecting(&dom).is_empty());

        dom.scroll_to(400.0);
        assert_eq!(obs.intersecting(&dom), vec![near]);
    }
}
