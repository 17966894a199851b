//! Scroll-triggered reveal of animatable elements.
//!
//! Every element carrying one of the intent classes is either
//! [`RevealState::Hidden`] or [`RevealState::Revealed`]. The controller only
//! ever moves elements forward; going back to `Hidden` happens solely
//! through [`RevealController::reinitialize`], which the filter triggers
//! after it changes the visible card set.
//!
//! Reset is split over two frames: the hidden state is written
//! synchronously, and the "visible now vs. observe later" partition runs
//! on the next frame so the browser never paints an element revealed and
//! hidden in the same frame.
//!
//! Instant reveals carry an inline `transition: none` for exactly one frame,
//! long enough for the revealed state to be committed without animating.
//! After that the stylesheet transitions apply again, so the filter's
//! fade-out still plays on cards that were revealed instantly.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::dom::{Dom, ElementId, Query};
use crate::options::SiteOptions;
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::stagger::StaggerScheduler;
use crate::visibility::{self, ObserverOptions, VisibilityObserver};

/// Inline property used to suppress the transition on instant reveals.
const TRANSITION_PROPERTY: &str = "transition";

/// Per-element reveal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// Waiting to be revealed.
    Hidden,
    /// Revealed; stays so until an external reset.
    Revealed,
}

/// Why the controller is not observing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// `init` has not run yet.
    Uninitialized,
    /// Normal operation with an observer.
    Observing,
    /// Reduced motion requested: everything revealed, nothing observed.
    ReducedMotion,
    /// No intersection support: everything revealed.
    Unsupported,
    /// No animatable markup on the page.
    Disabled,
}

/// Owns the visibility observer and every animatable element's state.
#[derive(Debug)]
pub struct RevealController {
    intent_classes: Vec<String>,
    grid_class: String,
    revealed_class: String,
    observer_options: ObserverOptions,
    stagger: StaggerScheduler,
    mode: RevealMode,
    elements: Vec<ElementId>,
    grids: Vec<ElementId>,
    states: FxHashMap<ElementId, RevealState>,
    observer: Option<VisibilityObserver>,
    pending_check: Option<TaskHandle>,
    pending_repartition: Option<TaskHandle>,
    pending_release: Option<TaskHandle>,
    suppressed: Vec<ElementId>,
}

impl RevealController {
    /// Controller configured from site options. Call [`init`](Self::init)
    /// once the document is ready.
    #[must_use]
    pub fn new(options: &SiteOptions) -> Self {
        Self {
            intent_classes: options.markers.intent_classes.clone(),
            grid_class: options.markers.grid_class.clone(),
            revealed_class: options.markers.revealed_class.clone(),
            observer_options: ObserverOptions {
                threshold: options.reveal.observer_threshold,
                bottom_margin: options.reveal.observer_bottom_margin_px,
            },
            stagger: StaggerScheduler::from_options(options),
            mode: RevealMode::Uninitialized,
            elements: Vec::new(),
            grids: Vec::new(),
            states: FxHashMap::default(),
            observer: None,
            pending_check: None,
            pending_repartition: None,
            pending_release: None,
            suppressed: Vec::new(),
        }
    }

    /// Collect animatable elements and reveal or start observing them.
    pub fn init(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        self.elements = self.collect_elements(dom);
        self.grids = dom.query_all(Query::Class(&self.grid_class));
        self.states = self
            .elements
            .iter()
            .map(|el| (*el, RevealState::Hidden))
            .collect();

        if self.elements.is_empty() {
            log::warn!("no animatable elements found; reveal disabled");
            self.mode = RevealMode::Disabled;
            return;
        }

        if dom.prefers_reduced_motion() {
            log::info!("reduced motion requested; revealing everything");
            self.mode = RevealMode::ReducedMotion;
            self.reveal_all(dom);
            return;
        }

        if !dom.supports_intersection() {
            log::warn!(
                "intersection observation unsupported; revealing everything"
            );
            self.mode = RevealMode::Unsupported;
            self.reveal_all(dom);
            return;
        }

        self.mode = RevealMode::Observing;
        self.restagger(dom);
        self.observer = Some(VisibilityObserver::new(self.observer_options));
        self.partition(dom, sched);
        log::info!(
            "reveal ready: {} elements, {} grids, {} observed",
            self.elements.len(),
            self.grids.len(),
            self.observed_count()
        );
    }

    /// Reset every element to hidden and re-partition on the next frame.
    ///
    /// Invoked when the visible card set changes. No-op unless observing.
    pub fn reinitialize(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        if self.mode != RevealMode::Observing {
            return;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
        self.cancel_pending(sched);
        self.suppressed.clear();

        for el in &self.elements {
            dom.remove_class(*el, &self.revealed_class);
            dom.remove_style(*el, TRANSITION_PROPERTY);
            let _ = self.states.insert(*el, RevealState::Hidden);
        }
        self.restagger(dom);

        self.pending_repartition =
            Some(sched.request_frame(Task::RevealRepartition));
        log::debug!("reveal reset; re-partitioning next frame");
    }

    /// Second half of [`reinitialize`](Self::reinitialize).
    pub fn on_repartition(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        self.pending_repartition = None;
        if self.mode == RevealMode::Observing {
            self.partition(dom, sched);
        }
    }

    /// Give instant reveals their stylesheet transition back once the
    /// revealed state has been on screen for a frame.
    pub fn on_release(&mut self, dom: &mut dyn Dom) {
        self.pending_release = None;
        for el in self.suppressed.drain(..) {
            dom.remove_style(el, TRANSITION_PROPERTY);
        }
    }

    /// Scroll or resize happened; schedule an observer evaluation.
    pub fn on_viewport_change(&mut self, sched: &mut Scheduler) {
        if self.observed_count() > 0 {
            self.request_check(sched);
        }
    }

    /// Reveal every observed element that now intersects, and stop
    /// observing it.
    pub fn on_check(&mut self, dom: &mut dyn Dom) {
        self.pending_check = None;
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let hits = observer.intersecting(dom);
        for el in &hits {
            let _ = observer.unobserve(*el);
        }
        for el in hits {
            dom.add_class(el, &self.revealed_class);
            let _ = self.states.insert(el, RevealState::Revealed);
            log::debug!("revealed {el}");
        }
    }

    /// Recompute stagger delays for every grid.
    pub fn restagger(&self, dom: &mut dyn Dom) {
        for grid in &self.grids {
            let _ = self.stagger.apply(dom, Some(*grid));
        }
    }

    /// Cancel pending work and stop observing.
    pub fn shutdown(&mut self, sched: &mut Scheduler) {
        self.cancel_pending(sched);
        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
    }

    /// Current operating mode.
    #[must_use]
    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    /// State of an animatable element (`None` for unknown elements).
    #[must_use]
    pub fn state(&self, element: ElementId) -> Option<RevealState> {
        self.states.get(&element).copied()
    }

    /// Animatable elements in document order.
    #[must_use]
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Whether `element` is registered with the observer.
    #[must_use]
    pub fn is_observing(&self, element: ElementId) -> bool {
        self.observer
            .as_ref()
            .is_some_and(|o| o.is_observing(element))
    }

    /// Number of elements registered with the observer.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observer.as_ref().map_or(0, VisibilityObserver::len)
    }

    /// Whether an observer was ever created.
    #[must_use]
    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Whether a reset is waiting for its re-partition frame.
    #[must_use]
    pub fn is_repartition_pending(&self) -> bool {
        self.pending_repartition.is_some()
    }

    /// Elements still carrying the instant-reveal transition override.
    #[must_use]
    pub fn suppressed(&self) -> &[ElementId] {
        &self.suppressed
    }

    fn cancel_pending(&mut self, sched: &mut Scheduler) {
        for handle in [
            self.pending_check.take(),
            self.pending_repartition.take(),
            self.pending_release.take(),
        ]
        .into_iter()
        .flatten()
        {
            let _ = sched.cancel(handle);
        }
    }

    fn collect_elements(&self, dom: &mut dyn Dom) -> Vec<ElementId> {
        let mut seen = FxHashSet::default();
        let mut elements: Vec<ElementId> = self
            .intent_classes
            .iter()
            .flat_map(|class| dom.query_all(Query::Class(class)))
            .filter(|el| seen.insert(*el))
            .collect();
        // Ids are assigned in document order on every backend.
        elements.sort_unstable();
        elements
    }

    fn reveal_all(&mut self, dom: &mut dyn Dom) {
        for el in &self.elements {
            dom.add_class(*el, &self.revealed_class);
            let _ = self.states.insert(*el, RevealState::Revealed);
        }
    }

    /// Reveal what is on screen now without a transition; observe the rest.
    fn partition(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        for el in &self.elements {
            if self.states.get(el) == Some(&RevealState::Revealed) {
                continue;
            }
            if visibility::is_in_viewport(dom, *el) {
                dom.set_style(*el, TRANSITION_PROPERTY, "none");
                dom.add_class(*el, &self.revealed_class);
                let _ = self.states.insert(*el, RevealState::Revealed);
                self.suppressed.push(*el);
            } else {
                observer.observe(*el);
            }
        }
        if !observer.is_empty() {
            self.request_check(sched);
        }
        if !self.suppressed.is_empty() && self.pending_release.is_none() {
            self.pending_release = Some(sched.request_frame(Task::RevealRelease));
        }
    }

    fn request_check(&mut self, sched: &mut Scheduler) {
        if self.pending_check.is_none() {
            self.pending_check = Some(sched.request_frame(Task::RevealCheck));
        }
    }
}
