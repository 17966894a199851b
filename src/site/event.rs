//! Input vocabulary of the site runtime.
//!
//! Every platform notification the motion core reacts to (scrolls,
//! resizes, clicks, pointer movement, media events) is represented as a
//! `SiteEvent`. Hosts translate their native events and pass them to
//! [`Site::handle_event`](super::Site::handle_event).

use glam::Vec2;

use crate::dom::ElementId;

/// Something happened on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SiteEvent {
    /// The document scrolled.
    Scroll,
    /// The viewport changed size.
    Resize,
    /// A filter control was clicked.
    FilterClick {
        /// Clicked control.
        control: ElementId,
    },
    /// The pointer entered a project card.
    PointerEnter {
        /// Hovered card.
        card: ElementId,
    },
    /// The pointer moved over a project card.
    PointerMove {
        /// Hovered card.
        card: ElementId,
        /// Pointer position in viewport coordinates.
        pointer: Vec2,
    },
    /// The pointer left a project card.
    PointerLeave {
        /// Card that was hovered.
        card: ElementId,
    },
    /// A card video finished pausing.
    VideoPaused {
        /// Paused video.
        video: ElementId,
    },
    /// The page is being hidden (`pagehide`).
    PageHide {
        /// The page goes into the back/forward cache and may be restored.
        persisted: bool,
    },
    /// The page is shown (`pageshow`).
    PageShow {
        /// The page was restored from the back/forward cache.
        persisted: bool,
    },
}

impl SiteEvent {
    /// Whether the event changes what is inside the viewport.
    #[must_use]
    pub const fn moves_viewport(&self) -> bool {
        matches!(
            self,
            Self::Scroll | Self::Resize | Self::PageShow { persisted: true }
        )
    }
}
