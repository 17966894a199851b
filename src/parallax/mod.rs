//! Pointer parallax on project cards.
//!
//! While the pointer is over a card, the card's image layer drifts a few
//! pixels opposite to the pointer, easing toward its target one frame at a
//! time. Each hovered card has its own [`ParallaxSession`]; the engine
//! never touches reveal or filter state.

pub mod flip;
pub mod session;
pub mod video;

use glam::Vec2;
use rustc_hash::FxHashMap;

pub use flip::FlipCycler;
pub use session::{ParallaxSession, ParallaxTuning, SessionPhase};
pub use video::HoverVideos;

use crate::dom::{Dom, ElementId, Query};
use crate::options::SiteOptions;
use crate::scheduler::{Scheduler, Task};

/// Inline property carrying the image-layer offset.
const TRANSFORM_PROPERTY: &str = "transform";

/// CSS transform for an image layer at `offset`.
#[must_use]
pub fn layer_transform(offset: Vec2, scale: f32) -> String {
    format!(
        "translate({:.2}px, {:.2}px) scale({scale})",
        offset.x, offset.y
    )
}

/// Owns every hover session and hover-video bookkeeping.
#[derive(Debug)]
pub struct ParallaxEngine {
    card_class: String,
    image_class: String,
    video_class: String,
    hover_class: String,
    tuning: ParallaxTuning,
    image_scale: f32,
    cards: Vec<ElementId>,
    sessions: FxHashMap<ElementId, ParallaxSession>,
    videos: HoverVideos,
}

impl ParallaxEngine {
    /// Engine configured from site options.
    #[must_use]
    pub fn new(options: &SiteOptions) -> Self {
        Self {
            card_class: options.markers.card_class.clone(),
            image_class: options.markers.card_image_class.clone(),
            video_class: options.markers.card_video_class.clone(),
            hover_class: options.markers.hover_class.clone(),
            tuning: ParallaxTuning::from_options(&options.parallax),
            image_scale: options.parallax.image_scale,
            cards: Vec::new(),
            sessions: FxHashMap::default(),
            videos: HoverVideos::default(),
        }
    }

    /// Find the cards to track.
    pub fn init(&mut self, dom: &mut dyn Dom) {
        self.cards = dom.query_all(Query::Class(&self.card_class));
        if self.cards.is_empty() {
            log::warn!("no project cards found; parallax disabled");
        } else {
            log::debug!("parallax tracking {} cards", self.cards.len());
        }
    }

    /// Pointer entered `card`: start a session and any hover video.
    pub fn pointer_enter(
        &mut self,
        dom: &mut dyn Dom,
        sched: &mut Scheduler,
        card: ElementId,
    ) {
        if !self.cards.contains(&card) {
            return;
        }
        if let Some(old) = self.sessions.insert(card, ParallaxSession::new()) {
            // Enter without a matching leave; drop the old step.
            if let Some(handle) = old.pending() {
                let _ = sched.cancel(handle);
            }
        }
        dom.add_class(card, &self.hover_class);
        if let Some(video) = dom.query_within(card, Query::Class(&self.video_class))
        {
            self.videos.start(dom, video);
        }
    }

    /// Pointer moved to `pointer` (viewport coordinates) over `card`.
    pub fn pointer_move(
        &mut self,
        dom: &mut dyn Dom,
        sched: &mut Scheduler,
        card: ElementId,
        pointer: Vec2,
    ) {
        let Some(session) = self.sessions.get_mut(&card) else {
            return;
        };
        session.target = self.tuning.target_for(pointer, &dom.bounding_rect(card));
        if session.phase == SessionPhase::Idle {
            session.phase = SessionPhase::Interpolating(
                sched.request_frame(Task::ParallaxStep { card }),
            );
        }
    }

    /// One interpolation step for `card`.
    pub fn on_step(
        &mut self,
        dom: &mut dyn Dom,
        sched: &mut Scheduler,
        card: ElementId,
    ) {
        let Some(session) = self.sessions.get_mut(&card) else {
            return;
        };
        let more = session.step(&self.tuning);
        session.phase = if more {
            SessionPhase::Interpolating(
                sched.request_frame(Task::ParallaxStep { card }),
            )
        } else {
            SessionPhase::Idle
        };
        let offset = session.current;
        if let Some(layer) = dom.query_within(card, Query::Class(&self.image_class))
        {
            dom.set_style(
                layer,
                TRANSFORM_PROPERTY,
                &layer_transform(offset, self.image_scale),
            );
        }
    }

    /// Pointer left `card`: cancel the step, reset the layer, stop video.
    pub fn pointer_leave(
        &mut self,
        dom: &mut dyn Dom,
        sched: &mut Scheduler,
        card: ElementId,
    ) {
        if let Some(session) = self.sessions.remove(&card) {
            if let Some(handle) = session.pending() {
                let _ = sched.cancel(handle);
            }
        }
        if !self.cards.contains(&card) {
            return;
        }
        dom.remove_class(card, &self.hover_class);
        if let Some(layer) = dom.query_within(card, Query::Class(&self.image_class))
        {
            dom.remove_style(layer, TRANSFORM_PROPERTY);
        }
        if let Some(video) = dom.query_within(card, Query::Class(&self.video_class))
        {
            self.videos.stop(dom, video);
        }
    }

    /// The platform reported that `video` paused.
    pub fn on_video_paused(&mut self, dom: &mut dyn Dom, video: ElementId) {
        self.videos.on_paused(dom, video);
    }

    /// End every session.
    pub fn shutdown(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        let hovered: Vec<_> = self.sessions.keys().copied().collect();
        for card in hovered {
            self.pointer_leave(dom, sched, card);
        }
    }

    /// Offset currently applied to `card`'s image layer.
    #[must_use]
    pub fn offset(&self, card: ElementId) -> Vec2 {
        self.sessions
            .get(&card)
            .map_or(Vec2::ZERO, |s| s.current)
    }

    /// Tracked cards in document order.
    #[must_use]
    pub fn cards(&self) -> &[ElementId] {
        &self.cards
    }

    /// Session for `card`, if hovered.
    #[must_use]
    pub fn session(&self, card: ElementId) -> Option<&ParallaxSession> {
        self.sessions.get(&card)
    }

    /// Number of hovered cards.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Hover-video bookkeeping.
    #[must_use]
    pub fn videos(&self) -> &HoverVideos {
        &self.videos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Rect, Viewport};

    struct Card {
        card: ElementId,
        image: ElementId,
        video: Option<ElementId>,
    }

    fn card(dom: &mut MemoryDom, top: f32, with_video: bool) -> Card {
        let card = dom.create(None, &["project-card"]);
        dom.set_rect(card, Rect::new(100.0, top, 400.0, 300.0));
        let image = dom.create(Some(card), &["project-image"]);
        let video = with_video.then(|| dom.create_video(Some(image), &["project-video"]));
        Card { card, image, video }
    }

    fn drain_frames(
        engine: &mut ParallaxEngine,
        dom: &mut MemoryDom,
        sched: &mut Scheduler,
        max_frames: usize,
    ) -> usize {
        let mut frames = 0;
        while sched.has_frame_work() && frames < max_frames {
            for task in sched.take_frame() {
                if let Task::ParallaxStep { card } = task {
                    engine.on_step(dom, sched, card);
                }
            }
            frames += 1;
        }
        frames
    }

    fn setup(with_video: bool) -> (MemoryDom, Scheduler, ParallaxEngine, Card) {
        let mut dom = MemoryDom::new(Viewport::new(1400.0, 900.0));
        let c = card(&mut dom, 100.0, with_video);
        let mut engine = ParallaxEngine::new(&SiteOptions::default());
        engine.init(&mut dom);
        (dom, Scheduler::new(), engine, c)
    }

    #[test]
    fn hover_converges_to_inverted_target() {
        let (mut dom, mut sched, mut engine, c) = setup(false);
        engine.pointer_enter(&mut dom, &mut sched, c.card);
        assert!(dom.has_class(c.card, "is-hovered"));

        // Bottom-right corner.
        engine.pointer_move(&mut dom, &mut sched, c.card, Vec2::new(500.0, 400.0));
        engine.pointer_move(&mut dom, &mut sched, c.card, Vec2::new(500.0, 400.0));
        assert_eq!(sched.pending_frames(), 1);

        let frames = drain_frames(&mut engine, &mut dom, &mut sched, 200);
        assert!(frames < 200);
        assert_eq!(engine.offset(c.card), Vec2::new(-5.0, -5.0));
        assert_eq!(
            dom.style(c.image, "transform").as_deref(),
            Some("translate(-5.00px, -5.00px) scale(1.05)")
        );
        assert_eq!(
            engine.session(c.card).map(|s| s.phase),
            Some(SessionPhase::Idle)
        );
    }

    #[test]
    fn leave_resets_and_cancels_pending_step() {
        let (mut dom, mut sched, mut engine, c) = setup(false);
        engine.pointer_enter(&mut dom, &mut sched, c.card);
        engine.pointer_move(&mut dom, &mut sched, c.card, Vec2::new(500.0, 400.0));
        let _ = drain_frames(&mut engine, &mut dom, &mut sched, 3);
        assert!(sched.has_frame_work());

        engine.pointer_leave(&mut dom, &mut sched, c.card);
        assert!(sched.is_idle());
        assert_eq!(engine.offset(c.card), Vec2::ZERO);
        assert_eq!(dom.style(c.image, "transform"), None);
        assert!(!dom.has_class(c.card, "is-hovered"));
        assert_eq!(engine.active_sessions(), 0);
    }

    #[test]
    fn move_without_enter_is_ignored() {
        let (mut dom, mut sched, mut engine, c) = setup(false);
        engine.pointer_move(&mut dom, &mut sched, c.card, Vec2::new(500.0, 400.0));
        assert!(sched.is_idle());
    }

    #[test]
    fn video_card_plays_and_rewinds_after_pause() {
        let (mut dom, mut sched, mut engine, c) = setup(true);
        let Some(video) = c.video else {
            return;
        };
        engine.pointer_enter(&mut dom, &mut sched, c.card);
        let state = dom.video(video).unwrap_or_default();
        assert!(state.playing && state.muted && state.looping && state.inline);

        dom.advance_video(video, 3.0);
        engine.pointer_leave(&mut dom, &mut sched, c.card);
        assert_eq!(dom.video(video).unwrap_or_default().current_time, 3.0);

        for paused in dom.take_pause_events() {
            engine.on_video_paused(&mut dom, paused);
        }
        let state = dom.video(video).unwrap_or_default();
        assert!(!state.playing);
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn blocked_autoplay_still_runs_parallax() {
        let (mut dom, mut sched, mut engine, c) = setup(true);
        dom.block_autoplay(true);
        engine.pointer_enter(&mut dom, &mut sched, c.card);
        engine.pointer_move(&mut dom, &mut sched, c.card, Vec2::new(100.0, 100.0));
        let _ = drain_frames(&mut engine, &mut dom, &mut sched, 200);
        assert_eq!(engine.offset(c.card), Vec2::new(5.0, 5.0));
    }
}
