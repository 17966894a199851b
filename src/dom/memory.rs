//! In-memory document used by tests and the rehearsal binary.

use std::collections::{BTreeMap, BTreeSet};

use super::{Dom, ElementId, PlaybackRejected, Query, Rect, Viewport};

/// Playback state of a simulated video element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VideoState {
    /// Currently playing.
    pub playing: bool,
    /// Started muted.
    pub muted: bool,
    /// Loops at the end.
    pub looping: bool,
    /// Plays inline rather than fullscreen.
    pub inline: bool,
    /// Playback position in seconds.
    pub current_time: f32,
}

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    /// Document coordinates (unaffected by scrolling).
    rect: Rect,
    video: Option<VideoState>,
}

/// A small element tree with layout rectangles, inline styles and video
/// state, enough to drive every controller without a browser.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    viewport: Viewport,
    scroll_y: f32,
    reduced_motion: bool,
    intersection: bool,
    autoplay_blocked: bool,
    pause_events: Vec<ElementId>,
}

impl MemoryDom {
    /// Empty document with the given viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            nodes: Vec::new(),
            viewport,
            scroll_y: 0.0,
            reduced_motion: false,
            intersection: true,
            autoplay_blocked: false,
            pause_events: Vec::new(),
        }
    }

    /// Append an element under `parent` (or at the root) with `classes`.
    pub fn create(
        &mut self,
        parent: Option<ElementId>,
        classes: &[&str],
    ) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        let node = Node {
            parent,
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
            ..Node::default()
        };
        self.nodes.push(node);
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    /// Append a video element under `parent`.
    pub fn create_video(
        &mut self,
        parent: Option<ElementId>,
        classes: &[&str],
    ) -> ElementId {
        let id = self.create(parent, classes);
        if let Some(node) = self.node_mut(id) {
            node.video = Some(VideoState::default());
        }
        id
    }

    /// Place `element` at `rect` in document coordinates.
    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(element) {
            node.rect = rect;
        }
    }

    /// Scroll the document so `y` is at the top of the viewport.
    pub fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y.max(0.0);
    }

    /// Current vertical scroll offset.
    #[must_use]
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Change the viewport size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Toggle the reduced-motion preference.
    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    /// Toggle support for intersection observation.
    pub fn set_intersection_support(&mut self, on: bool) {
        self.intersection = on;
    }

    /// Make every `play` request fail as if blocked by autoplay policy.
    pub fn block_autoplay(&mut self, on: bool) {
        self.autoplay_blocked = on;
    }

    /// Playback state of a video element.
    #[must_use]
    pub fn video(&self, video: ElementId) -> Option<VideoState> {
        self.node(video).and_then(|n| n.video)
    }

    /// Advance a playing video's position by `secs`.
    pub fn advance_video(&mut self, video: ElementId, secs: f32) {
        if let Some(state) = self.node_mut(video).and_then(|n| n.video.as_mut())
        {
            if state.playing {
                state.current_time += secs;
            }
        }
    }

    /// Drain the pause notifications raised since the last call.
    pub fn take_pause_events(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.pause_events)
    }

    /// All classes on `element`, sorted.
    #[must_use]
    pub fn classes(&self, element: ElementId) -> Vec<String> {
        self.node(element)
            .map(|n| n.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of elements in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn matches(node: &Node, query: Query<'_>) -> bool {
        match query {
            Query::Class(class) => node.classes.contains(class),
            Query::Attribute(attr) => node.attributes.contains_key(attr),
        }
    }

    fn ids(&self) -> impl Iterator<Item = (ElementId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (ElementId(i as u32), n))
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl Dom for MemoryDom {
    fn query_all(&mut self, query: Query<'_>) -> Vec<ElementId> {
        self.ids()
            .filter(|(_, n)| Self::matches(n, query))
            .map(|(id, _)| id)
            .collect()
    }

    fn query_within(
        &mut self,
        root: ElementId,
        query: Query<'_>,
    ) -> Option<ElementId> {
        // Ids are handed out in creation order, which for this tree is
        // document order.
        self.ids()
            .filter(|(id, _)| *id != root)
            .find(|(id, n)| Self::matches(n, query) && self.contains(root, *id))
            .map(|(id, _)| id)
    }

    fn children(&mut self, parent: ElementId) -> Vec<ElementId> {
        self.node(parent)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element).is_some_and(|n| n.classes.contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            let _ = node.classes.insert(class.to_owned());
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            let _ = node.classes.remove(class);
        }
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)
            .and_then(|n| n.attributes.get(name))
            .cloned()
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            let _ = node.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.node(element).and_then(|n| n.styles.get(property)).cloned()
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            let _ = node.styles.insert(property.to_owned(), value.to_owned());
        }
    }

    fn remove_style(&mut self, element: ElementId, property: &str) {
        if let Some(node) = self.node_mut(element) {
            let _ = node.styles.remove(property);
        }
    }

    fn is_displayed(&self, element: ElementId) -> bool {
        let mut cursor = Some(element);
        let mut seen = false;
        while let Some(id) = cursor {
            let Some(node) = self.node(id) else {
                return seen;
            };
            if node.styles.get("display").is_some_and(|d| d == "none") {
                return false;
            }
            seen = true;
            cursor = node.parent;
        }
        seen
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        if !self.is_displayed(element) {
            return Rect::default();
        }
        self.node(element)
            .map(|n| n.rect.translated(0.0, -self.scroll_y))
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn supports_intersection(&self) -> bool {
        self.intersection
    }

    fn play_inline_loop(
        &mut self,
        video: ElementId,
    ) -> Result<(), PlaybackRejected> {
        let blocked = self.autoplay_blocked;
        let Some(state) = self.node_mut(video).and_then(|n| n.video.as_mut())
        else {
            return Err(PlaybackRejected(format!("{video} is not a video")));
        };
        state.muted = true;
        state.looping = true;
        state.inline = true;
        if blocked {
            return Err(PlaybackRejected("autoplay blocked".to_owned()));
        }
        state.playing = true;
        Ok(())
    }

    fn is_playing(&self, video: ElementId) -> bool {
        self.video(video).is_some_and(|v| v.playing)
    }

    fn pause(&mut self, video: ElementId) {
        let was_playing =
            match self.node_mut(video).and_then(|n| n.video.as_mut()) {
                Some(state) if state.playing => {
                    state.playing = false;
                    true
                }
                _ => false,
            };
        if was_playing {
            self.pause_events.push(video);
        }
    }

    fn rewind(&mut self, video: ElementId) {
        if let Some(state) = self.node_mut(video).and_then(|n| n.video.as_mut())
        {
            state.current_time = 0.0;
        }
    }
}
