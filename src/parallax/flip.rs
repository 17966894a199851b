//! Mobile-only flip of the card nearest the viewport's vertical center.
//!
//! On narrow viewports there is no hover, so the centered card flips every
//! interval instead. The centered card is recomputed at most once per
//! frame after scroll or resize.

use std::time::Duration;

use crate::dom::{Dom, ElementId, Query};
use crate::options::SiteOptions;
use crate::scheduler::{Scheduler, Task, TaskHandle};

/// Owns the "which card is centered" state and the flip timer.
#[derive(Debug)]
pub struct FlipCycler {
    card_class: String,
    flipped_class: String,
    interval: Duration,
    mobile_max_width: f32,
    cards: Vec<ElementId>,
    centered: Option<ElementId>,
    tick: Option<TaskHandle>,
    recenter: Option<TaskHandle>,
}

impl FlipCycler {
    /// Cycler configured from site options.
    #[must_use]
    pub fn new(options: &SiteOptions) -> Self {
        Self {
            card_class: options.markers.card_class.clone(),
            flipped_class: options.markers.flipped_class.clone(),
            interval: options.flip.interval(),
            mobile_max_width: options.flip.mobile_max_width,
            cards: Vec::new(),
            centered: None,
            tick: None,
            recenter: None,
        }
    }

    /// Find cards and compute the centered one on the next frame.
    pub fn init(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        self.cards = dom.query_all(Query::Class(&self.card_class));
        if self.cards.is_empty() {
            log::debug!("flip: no cards");
            return;
        }
        self.on_viewport_change(sched);
    }

    /// Scroll or resize: recompute on the next frame (once).
    pub fn on_viewport_change(&mut self, sched: &mut Scheduler) {
        if self.recenter.is_none() && !self.cards.is_empty() {
            self.recenter = Some(sched.request_frame(Task::FlipRecenter));
        }
    }

    /// Pick the card nearest the vertical center and keep the timer
    /// running while the viewport is mobile-sized.
    pub fn on_recenter(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        self.recenter = None;
        let viewport = dom.viewport();
        if viewport.width > self.mobile_max_width {
            self.deactivate(dom, sched);
            return;
        }

        let middle = viewport.height * 0.5;
        let nearest = self
            .cards
            .iter()
            .copied()
            .filter(|c| dom.is_displayed(*c))
            .map(|c| (c, (dom.bounding_rect(c).center().y - middle).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c);

        if nearest != self.centered {
            if let Some(previous) = self.centered {
                dom.remove_class(previous, &self.flipped_class);
            }
            self.centered = nearest;
        }

        match (self.centered, self.tick) {
            (Some(_), None) => {
                self.tick = Some(sched.set_timeout(self.interval, Task::FlipTick));
            }
            (None, Some(handle)) => {
                let _ = sched.cancel(handle);
                self.tick = None;
            }
            _ => {}
        }
    }

    /// Flip timer fired.
    pub fn on_tick(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        self.tick = None;
        let Some(card) = self.centered else {
            return;
        };
        let _ = dom.toggle_class(card, &self.flipped_class);
        self.tick = Some(sched.set_timeout(self.interval, Task::FlipTick));
    }

    /// Cancel pending work and unflip.
    pub fn shutdown(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        self.deactivate(dom, sched);
        if let Some(handle) = self.recenter.take() {
            let _ = sched.cancel(handle);
        }
    }

    /// Card currently nearest the viewport center (mobile only).
    #[must_use]
    pub fn centered(&self) -> Option<ElementId> {
        self.centered
    }

    /// Whether the flip timer is running.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    fn deactivate(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        if let Some(card) = self.centered.take() {
            dom.remove_class(card, &self.flipped_class);
        }
        if let Some(handle) = self.tick.take() {
            let _ = sched.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Rect, Viewport};

    fn column(dom: &mut MemoryDom, n: usize) -> Vec<ElementId> {
        (0..n)
            .map(|i| {
                let card = dom.create(None, &["project-card"]);
                dom.set_rect(
                    card,
                    Rect::new(0.0, i as f32 * 400.0, 375.0, 350.0),
                );
                card
            })
            .collect()
    }

    fn run_frame(flip: &mut FlipCycler, dom: &mut MemoryDom, sched: &mut Scheduler) {
        for task in sched.take_frame() {
            if task == Task::FlipRecenter {
                flip.on_recenter(dom, sched);
            }
        }
    }

    fn run_timers(
        flip: &mut FlipCycler,
        dom: &mut MemoryDom,
        sched: &mut Scheduler,
        ms: u64,
    ) {
        let until = sched.now() + Duration::from_millis(ms);
        while let Some(task) = sched.pop_due(until) {
            if task == Task::FlipTick {
                flip.on_tick(dom, sched);
            }
        }
        sched.advance_clock(until);
    }

    #[test]
    fn flips_the_centered_card_every_interval() {
        let mut dom = MemoryDom::new(Viewport::new(375.0, 800.0));
        let cards = column(&mut dom, 4);
        let mut sched = Scheduler::new();
        let mut flip = FlipCycler::new(&SiteOptions::default());

        flip.init(&mut dom, &mut sched);
        run_frame(&mut flip, &mut dom, &mut sched);
        // Centers sit at 175, 575, 975, 1375; the middle line is at 400.
        assert_eq!(flip.centered(), Some(cards[1]));

        dom.scroll_to(400.0);
        flip.on_viewport_change(&mut sched);
        flip.on_viewport_change(&mut sched);
        assert_eq!(sched.pending_frames(), 1);
        run_frame(&mut flip, &mut dom, &mut sched);
        assert_eq!(flip.centered(), Some(cards[2]));

        run_timers(&mut flip, &mut dom, &mut sched, 1000);
        assert!(dom.has_class(cards[2], "flipped"));
        run_timers(&mut flip, &mut dom, &mut sched, 1000);
        assert!(!dom.has_class(cards[2], "flipped"));
        run_timers(&mut flip, &mut dom, &mut sched, 1000);
        assert!(dom.has_class(cards[2], "flipped"));

        // Moving on unflips the previous card.
        dom.scroll_to(800.0);
        flip.on_viewport_change(&mut sched);
        run_frame(&mut flip, &mut dom, &mut sched);
        assert_eq!(flip.centered(), Some(cards[3]));
        assert!(!dom.has_class(cards[2], "flipped"));
    }

    #[test]
    fn desktop_width_stops_flipping() {
        let mut dom = MemoryDom::new(Viewport::new(375.0, 800.0));
        let cards = column(&mut dom, 2);
        let mut sched = Scheduler::new();
        let mut flip = FlipCycler::new(&SiteOptions::default());
        flip.init(&mut dom, &mut sched);
        run_frame(&mut flip, &mut dom, &mut sched);
        run_timers(&mut flip, &mut dom, &mut sched, 1000);
        assert!(dom.has_class(cards[1], "flipped"));

        dom.resize(1200.0, 800.0);
        flip.on_viewport_change(&mut sched);
        run_frame(&mut flip, &mut dom, &mut sched);
        assert_eq!(flip.centered(), None);
        assert!(!flip.is_ticking());
        assert!(!dom.has_class(cards[1], "flipped"));
        assert!(sched.is_idle());
    }
}
