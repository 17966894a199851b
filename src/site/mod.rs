//! The site runtime: owns the document, the scheduler and every motion
//! controller, and routes platform events and fired tasks between them.
//!
//! ```text
//!   SiteEvent ──► Site::handle_event ──► controller ──► Scheduler
//!                                                          │
//!   Site::advance_to / run_frame ◄─────── fired Task ◄─────┘
//! ```
//!
//! The only cross-controller link is [`SiteSignal::FilterChanged`]: the
//! filter emits it once its transition settles, and the runtime answers by
//! re-initializing reveal.

mod event;
mod signal;

use std::time::Duration;

use glam::Vec2;

pub use event::SiteEvent;
pub use signal::SiteSignal;

use crate::dom::{Dom, ElementId};
use crate::filter::FilterController;
use crate::options::SiteOptions;
use crate::parallax::{FlipCycler, ParallaxEngine};
use crate::reveal::RevealController;
use crate::scheduler::{Scheduler, Task, TaskHandle};

/// Length of one simulated display frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Motion core bound to one document.
#[derive(Debug)]
pub struct Site<D: Dom> {
    dom: D,
    sched: Scheduler,
    options: SiteOptions,
    reveal: RevealController,
    filter: FilterController,
    parallax: ParallaxEngine,
    flip: FlipCycler,
    resize_debounce: Option<TaskHandle>,
    outbox: Vec<SiteSignal>,
    started: bool,
}

impl<D: Dom> Site<D> {
    /// Bind the controllers to `dom`. Nothing touches the document until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(dom: D, options: SiteOptions) -> Self {
        let options = options.sanitized();
        Self {
            reveal: RevealController::new(&options),
            filter: FilterController::new(&options),
            parallax: ParallaxEngine::new(&options),
            flip: FlipCycler::new(&options),
            dom,
            sched: Scheduler::new(),
            options,
            resize_debounce: None,
            outbox: Vec::new(),
            started: false,
        }
    }

    /// Page is ready: initialize every controller. Calling twice is a
    /// no-op.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.reveal.init(&mut self.dom, &mut self.sched);
        self.filter.init(&mut self.dom);
        self.parallax.init(&mut self.dom);
        self.flip.init(&mut self.dom, &mut self.sched);
        log::info!(
            "site started: {} animatable, {} cards, {} tasks pending",
            self.reveal.elements().len(),
            self.filter.cards().len(),
            self.sched.pending_timers() + self.sched.pending_frames()
        );
    }

    /// Route a platform event to the controller that owns it.
    pub fn handle_event(&mut self, event: SiteEvent) {
        if !self.started {
            log::debug!("ignoring {event:?} before start");
            return;
        }
        if event.moves_viewport() {
            self.reveal.on_viewport_change(&mut self.sched);
            self.flip.on_viewport_change(&mut self.sched);
        }
        match event {
            SiteEvent::Scroll => {}
            SiteEvent::Resize => self.debounce_resize(),
            SiteEvent::FilterClick { control } => {
                self.filter
                    .select_control(&mut self.dom, &mut self.sched, control);
            }
            SiteEvent::PointerEnter { card } => {
                self.parallax
                    .pointer_enter(&mut self.dom, &mut self.sched, card);
            }
            SiteEvent::PointerMove { card, pointer } => {
                self.parallax.pointer_move(
                    &mut self.dom,
                    &mut self.sched,
                    card,
                    pointer,
                );
            }
            SiteEvent::PointerLeave { card } => {
                self.parallax
                    .pointer_leave(&mut self.dom, &mut self.sched, card);
            }
            SiteEvent::VideoPaused { video } => {
                self.parallax.on_video_paused(&mut self.dom, video);
            }
            // A cached page keeps its state and resumes on `PageShow`.
            SiteEvent::PageHide { persisted: true } => {
                log::debug!("page cached; keeping motion state");
            }
            SiteEvent::PageHide { persisted: false } => self.shutdown(),
            SiteEvent::PageShow { persisted } => {
                if persisted {
                    log::debug!("page restored from cache");
                    self.debounce_resize();
                }
            }
        }
    }

    /// Shorthand for a [`SiteEvent::PointerMove`].
    pub fn pointer_move(&mut self, card: ElementId, x: f32, y: f32) {
        self.handle_event(SiteEvent::PointerMove {
            card,
            pointer: Vec2::new(x, y),
        });
    }

    /// Run a fired task.
    pub fn dispatch(&mut self, task: Task) {
        let (dom, sched) = (&mut self.dom, &mut self.sched);
        match task {
            Task::RevealCheck => self.reveal.on_check(dom),
            Task::RevealRepartition => self.reveal.on_repartition(dom, sched),
            Task::RevealRelease => self.reveal.on_release(dom),
            Task::FilterDisplay { card, show } => {
                self.filter.on_display(dom, card, show);
            }
            Task::FilterSettled => {
                let signal = self.filter.on_settled();
                self.broadcast(signal);
            }
            Task::ParallaxStep { card } => self.parallax.on_step(dom, sched, card),
            Task::ResizeSettled => {
                self.resize_debounce = None;
                let viewport = dom.viewport();
                log::debug!(
                    "resize settled at {}x{} ({} columns)",
                    viewport.width,
                    viewport.height,
                    self.options.layout.column_count(viewport.width)
                );
                self.reveal.restagger(dom);
            }
            Task::FlipRecenter => self.flip.on_recenter(dom, sched),
            Task::FlipTick => self.flip.on_tick(dom, sched),
        }
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(task) = self.sched.pop_due(now) {
            self.dispatch(task);
        }
        self.sched.advance_clock(now);
    }

    /// Run the callbacks waiting for this frame. Returns how many ran.
    pub fn run_frame(&mut self) -> usize {
        let batch = self.sched.take_frame();
        let ran = batch.len();
        for task in batch {
            self.dispatch(task);
        }
        ran
    }

    /// Simulate `duration` of wall time in [`FRAME_INTERVAL`] steps.
    ///
    /// Each step runs the callbacks already waiting for a frame, then moves
    /// the clock and fires the timers that came due. Frame callbacks
    /// requested by those timers wait for the following step.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.sched.now() + duration;
        loop {
            let _ = self.run_frame();
            let next = (self.sched.now() + FRAME_INTERVAL).min(end);
            self.advance_to(next);
            if next >= end {
                break;
            }
        }
    }

    /// Drain signals broadcast since the last call.
    pub fn take_signals(&mut self) -> Vec<SiteSignal> {
        std::mem::take(&mut self.outbox)
    }

    /// Cancel every outstanding timer and frame callback and reset hover
    /// state. The document keeps its current classes otherwise.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.resize_debounce.take() {
            let _ = self.sched.cancel(handle);
        }
        self.reveal.shutdown(&mut self.sched);
        self.filter.shutdown(&mut self.sched);
        self.parallax.shutdown(&mut self.dom, &mut self.sched);
        self.flip.shutdown(&mut self.dom, &mut self.sched);
        let stray = self.sched.clear();
        if stray > 0 {
            log::warn!("{stray} tasks still pending at shutdown");
        }
        self.started = false;
        log::info!("site stopped");
    }

    /// The document.
    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the document (hosts update scroll and size here
    /// before reporting the event).
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// The scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.sched
    }

    /// Effective (sanitized) options.
    #[must_use]
    pub fn options(&self) -> &SiteOptions {
        &self.options
    }

    /// Reveal controller.
    #[must_use]
    pub fn reveal(&self) -> &RevealController {
        &self.reveal
    }

    /// Filter controller.
    #[must_use]
    pub fn filter(&self) -> &FilterController {
        &self.filter
    }

    /// Parallax engine.
    #[must_use]
    pub fn parallax(&self) -> &ParallaxEngine {
        &self.parallax
    }

    /// Mobile flip cycler.
    #[must_use]
    pub fn flip(&self) -> &FlipCycler {
        &self.flip
    }

    /// Whether [`start`](Self::start) has run.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    fn debounce_resize(&mut self) {
        if let Some(handle) = self.resize_debounce.take() {
            let _ = self.sched.cancel(handle);
        }
        self.resize_debounce = Some(self.sched.set_timeout(
            self.options.layout.resize_debounce(),
            Task::ResizeSettled,
        ));
    }

    fn broadcast(&mut self, signal: SiteSignal) {
        log::debug!("broadcast {signal}");
        match signal {
            SiteSignal::FilterChanged => {
                self.reveal.reinitialize(&mut self.dom, &mut self.sched);
            }
        }
        self.outbox.push(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{CardFixture, FixturePage, MemoryDom, PageFixture};
    use crate::reveal::RevealState;

    fn fixture(tags: &[&str]) -> PageFixture {
        PageFixture {
            cards: tags
                .iter()
                .map(|t| CardFixture {
                    categories: (*t).to_owned(),
                    ..CardFixture::default()
                })
                .collect(),
            ..PageFixture::default()
        }
    }

    fn site(fixture: &PageFixture) -> (Site<MemoryDom>, FixturePage) {
        let options = SiteOptions::default();
        let (dom, page) = fixture.build(&options);
        let mut site = Site::new(dom, options);
        site.start();
        (site, page)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn events_before_start_are_ignored() {
        let (dom, page) = fixture(&["web"]).build(&SiteOptions::default());
        let mut site = Site::new(dom, SiteOptions::default());
        site.handle_event(SiteEvent::FilterClick {
            control: page.controls[1],
        });
        assert!(site.scheduler().is_idle());
        assert!(!site.is_started());
    }

    #[test]
    fn hero_reveals_on_load_and_cards_on_scroll() {
        let (mut site, page) = site(&fixture(&["web", "design", "web"]));
        let hero = page.hero.unwrap();
        assert_eq!(site.reveal().state(hero), Some(RevealState::Revealed));
        assert_eq!(site.reveal().observed_count(), 3);

        site.run_for(ms(50));
        assert_eq!(site.reveal().observed_count(), 3);

        site.dom_mut().scroll_to(600.0);
        site.handle_event(SiteEvent::Scroll);
        site.run_for(ms(16));
        for card in &page.cards {
            assert_eq!(site.reveal().state(*card), Some(RevealState::Revealed));
            assert!(site.dom().has_class(*card, "visible"));
        }
        assert_eq!(site.reveal().observed_count(), 0);
    }

    #[test]
    fn filter_change_reinitializes_reveal() {
        let (mut site, page) = site(&fixture(&["web", "design", "web", "design"]));
        let design = page.controls[2];
        site.handle_event(SiteEvent::FilterClick { control: design });

        site.run_for(ms(599));
        assert!(site.take_signals().is_empty());
        site.run_for(ms(1));
        assert_eq!(site.take_signals(), vec![SiteSignal::FilterChanged]);
        assert!(site.reveal().is_repartition_pending());

        site.run_for(ms(16));
        assert!(!site.reveal().is_repartition_pending());
        // Cards are below the fold, so the visible ones are observed again.
        assert!(site.reveal().is_observing(page.cards[1]));
        assert!(site.reveal().is_observing(page.cards[3]));
        assert_eq!(
            site.dom().style(page.cards[1], "transition-delay").as_deref(),
            Some("0ms")
        );
        assert_eq!(
            site.dom().style(page.cards[3], "transition-delay").as_deref(),
            Some("100ms")
        );
        assert_eq!(site.dom().style(page.cards[0], "transition-delay"), None);
    }

    #[test]
    fn resize_is_debounced() {
        let (mut site, _page) = site(&fixture(&["web"; 5]));
        site.dom_mut().resize(600.0, 900.0);
        site.handle_event(SiteEvent::Resize);
        site.run_for(ms(100));
        site.handle_event(SiteEvent::Resize);
        site.run_for(ms(100));
        assert!(site.resize_debounce.is_some());
        site.run_for(ms(60));
        assert!(site.resize_debounce.is_none());
    }

    #[test]
    fn cached_page_keeps_running_after_restore() {
        let (mut site, page) = site(&fixture(&["web", "design"]));
        site.handle_event(SiteEvent::PageHide { persisted: true });
        assert!(site.is_started());

        site.handle_event(SiteEvent::PageShow { persisted: true });
        site.handle_event(SiteEvent::FilterClick {
            control: page.controls[1],
        });
        site.run_for(ms(700));
        assert_eq!(site.take_signals(), vec![SiteSignal::FilterChanged]);
        assert!(!site.dom().is_displayed(page.cards[1]));
    }

    #[test]
    fn unload_shuts_the_site_down() {
        let (mut site, page) = site(&fixture(&["web", "design"]));
        site.handle_event(SiteEvent::PointerEnter { card: page.cards[0] });
        site.handle_event(SiteEvent::PageHide { persisted: false });
        assert!(!site.is_started());
        assert!(site.scheduler().is_idle());

        site.handle_event(SiteEvent::FilterClick {
            control: page.controls[1],
        });
        assert!(site.scheduler().is_idle());
    }

    #[test]
    fn shutdown_leaves_nothing_scheduled() {
        let (mut site, page) = site(&fixture(&["web", "design"]));
        site.handle_event(SiteEvent::PointerEnter { card: page.cards[0] });
        site.pointer_move(page.cards[0], 0.0, 0.0);
        site.handle_event(SiteEvent::FilterClick {
            control: page.controls[1],
        });
        site.handle_event(SiteEvent::Resize);
        assert!(!site.scheduler().is_idle());

        site.shutdown();
        assert!(site.scheduler().is_idle());
        assert_eq!(site.parallax().active_sessions(), 0);
    }
}
