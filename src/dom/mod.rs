//! The DOM port: everything the motion controllers read from or write to
//! the live document goes through the [`Dom`] trait.
//!
//! Two implementations exist: [`MemoryDom`], an in-memory document used by
//! tests and the rehearsal binary, and `WebDom` (feature `web`) backed by
//! `web-sys`.

pub mod fixture;
mod memory;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use fixture::{CardFixture, FixturePage, PageFixture};
pub use memory::{MemoryDom, VideoState};

/// Opaque handle to an element known to a [`Dom`].
///
/// Handles are stable for the lifetime of the document; the same element
/// always maps to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural marker used to look elements up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// Elements carrying this class.
    Class(&'a str),
    /// Elements carrying this attribute (any value).
    Attribute(&'a str),
}

impl Query<'_> {
    /// CSS selector equivalent of this query.
    #[must_use]
    pub fn to_selector(&self) -> String {
        match self {
            Query::Class(class) => format!(".{class}"),
            Query::Attribute(attr) => format!("[{attr}]"),
        }
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width (never negative).
    pub width: f32,
    /// Height (never negative).
    pub height: f32,
}

impl Rect {
    /// Rectangle from its top-left corner and size.
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.left + self.width * 0.5,
            self.top + self.height * 0.5,
        )
    }

    /// Same rectangle shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }
}

/// Size of the layout viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f32,
    /// Viewport height.
    pub height: f32,
}

impl Viewport {
    /// Viewport of the given size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1400.0, 900.0)
    }
}

/// A media element refused to start playing (usually autoplay policy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRejected(pub String);

impl fmt::Display for PlaybackRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "playback rejected: {}", self.0)
    }
}

impl std::error::Error for PlaybackRejected {}

/// Live document surface the controllers operate on.
///
/// Every method is a no-op (or returns a neutral value) for an id the
/// document does not know, so controllers never have to guard against
/// elements that disappeared.
pub trait Dom {
    /// All elements matching `query`, in document order.
    fn query_all(&mut self, query: Query<'_>) -> Vec<ElementId>;

    /// First descendant of `root` matching `query`.
    fn query_within(
        &mut self,
        root: ElementId,
        query: Query<'_>,
    ) -> Option<ElementId>;

    /// Direct element children of `parent`, in document order.
    fn children(&mut self, parent: ElementId) -> Vec<ElementId>;

    /// Whether `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool;

    /// Whether `element` carries `class`.
    fn has_class(&self, element: ElementId, class: &str) -> bool;

    /// Add `class` to `element`.
    fn add_class(&mut self, element: ElementId, class: &str);

    /// Remove `class` from `element`.
    fn remove_class(&mut self, element: ElementId, class: &str);

    /// Flip `class` on `element`; returns whether it is now present.
    fn toggle_class(&mut self, element: ElementId, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            true
        }
    }

    /// Add or remove `class` according to `on`.
    fn set_class(&mut self, element: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(element, class);
        } else {
            self.remove_class(element, class);
        }
    }

    /// Attribute value, if present.
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Set an attribute value.
    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    /// Inline style property value, if set.
    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    /// Set an inline style property.
    fn set_style(&mut self, element: ElementId, property: &str, value: &str);

    /// Remove an inline style property.
    fn remove_style(&mut self, element: ElementId, property: &str);

    /// Whether the computed `display` of `element` is not `none`.
    fn is_displayed(&self, element: ElementId) -> bool;

    /// Bounding rectangle relative to the viewport. All zeros for elements
    /// that are not rendered.
    fn bounding_rect(&self, element: ElementId) -> Rect;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool;

    /// Whether the platform has an intersection-observation primitive.
    fn supports_intersection(&self) -> bool;

    /// Start muted, looping, inline playback of a video element.
    fn play_inline_loop(
        &mut self,
        video: ElementId,
    ) -> Result<(), PlaybackRejected>;

    /// Whether a video element is currently playing (not paused).
    fn is_playing(&self, video: ElementId) -> bool;

    /// Pause a video element. If it was playing, the platform reports
    /// completion later as a pause notification.
    fn pause(&mut self, video: ElementId);

    /// Seek a video element back to its start.
    fn rewind(&mut self, video: ElementId);
}
