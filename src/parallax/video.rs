//! Hover playback for cards whose image layer is a looping video.
//!
//! Playback starts muted, looping and inline on pointer-enter. On
//! pointer-leave the video is paused, and only once the platform confirms
//! the pause is it rewound, so the rewind never races a play request that
//! is still in flight.

use rustc_hash::FxHashSet;

use crate::dom::{Dom, ElementId};

/// Tracks videos that were asked to pause and still owe a rewind.
#[derive(Debug, Default)]
pub struct HoverVideos {
    awaiting_pause: FxHashSet<ElementId>,
}

impl HoverVideos {
    /// Start playback. A rejected play (autoplay policy) is ignored.
    pub fn start(&mut self, dom: &mut dyn Dom, video: ElementId) {
        // Re-entering before the pause landed: keep the position.
        let _ = self.awaiting_pause.remove(&video);
        if let Err(e) = dom.play_inline_loop(video) {
            log::debug!("{video}: {e}");
        }
    }

    /// Pause playback; the rewind waits for [`on_paused`](Self::on_paused).
    ///
    /// A video that never started (rejected play) gets no pause
    /// notification, so nothing is left waiting for one.
    pub fn stop(&mut self, dom: &mut dyn Dom, video: ElementId) {
        if dom.is_playing(video) {
            let _ = self.awaiting_pause.insert(video);
        } else {
            let _ = self.awaiting_pause.remove(&video);
        }
        dom.pause(video);
    }

    /// The platform reported that `video` paused.
    pub fn on_paused(&mut self, dom: &mut dyn Dom, video: ElementId) {
        if self.awaiting_pause.remove(&video) {
            dom.rewind(video);
        }
    }

    /// Whether `video` is waiting for its pause notification.
    #[must_use]
    pub fn is_awaiting_pause(&self, video: ElementId) -> bool {
        self.awaiting_pause.contains(&video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn rewind_waits_for_pause_notification() {
        let mut dom = MemoryDom::default();
        let video = dom.create_video(None, &["project-video"]);
        let mut videos = HoverVideos::default();

        videos.start(&mut dom, video);
        dom.advance_video(video, 2.0);
        videos.stop(&mut dom, video);

        let state = dom.video(video).unwrap_or_default();
        assert!(!state.playing);
        assert_eq!(state.current_time, 2.0);
        assert!(videos.is_awaiting_pause(video));

        for paused in dom.take_pause_events() {
            videos.on_paused(&mut dom, paused);
        }
        assert_eq!(dom.video(video).unwrap_or_default().current_time, 0.0);
        assert!(!videos.is_awaiting_pause(video));
    }

    #[test]
    fn reentering_before_pause_keeps_position() {
        let mut dom = MemoryDom::default();
        let video = dom.create_video(None, &["project-video"]);
        let mut videos = HoverVideos::default();

        videos.start(&mut dom, video);
        dom.advance_video(video, 1.5);
        videos.stop(&mut dom, video);
        let pauses = dom.take_pause_events();
        videos.start(&mut dom, video);
        for paused in pauses {
            videos.on_paused(&mut dom, paused);
        }

        let state = dom.video(video).unwrap_or_default();
        assert!(state.playing);
        assert_eq!(state.current_time, 1.5);
    }

    #[test]
    fn rejected_playback_is_silent() {
        let mut dom = MemoryDom::default();
        dom.block_autoplay(true);
        let video = dom.create_video(None, &["project-video"]);
        let mut videos = HoverVideos::default();

        videos.start(&mut dom, video);
        videos.stop(&mut dom, video);
        assert!(!dom.video(video).unwrap_or_default().playing);
        // Nothing was playing, so no pause notification arrives.
        assert!(dom.take_pause_events().is_empty());
        assert!(!videos.is_awaiting_pause(video));
    }
}
