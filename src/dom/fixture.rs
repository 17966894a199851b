//! TOML page fixtures for the in-memory document.
//!
//! A fixture describes a portfolio page at the level the motion core cares
//! about: viewport, platform preferences and a list of project cards with
//! their categories. [`PageFixture::build`] lays the cards out in the
//! responsive grid and emits the markup contract described by
//! [`MarkerOptions`](crate::options::MarkerOptions).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Dom, ElementId, MemoryDom, Rect, Viewport};
use crate::error::SiteError;
use crate::filter::ALL;
use crate::options::SiteOptions;

/// One project card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CardFixture {
    /// Display title (logging only).
    pub title: String,
    /// Space-separated category tags.
    pub categories: String,
    /// Whether the image layer is a looping video.
    pub video: bool,
}

/// Page description loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageFixture {
    /// Initial viewport.
    pub viewport: Viewport,
    /// Reduced-motion preference.
    pub reduced_motion: bool,
    /// Whether intersection observation is available.
    pub intersection: bool,
    /// Whether video playback requests are rejected.
    pub autoplay_blocked: bool,
    /// Add an animated hero block above the fold.
    pub hero: bool,
    /// Add a collapsible mobile filter menu mirroring the filter bar.
    pub mobile_menu: bool,
    /// Document y of the project grid.
    pub grid_top: f32,
    /// Card height in pixels.
    pub card_height: f32,
    /// Gap between cards in pixels.
    pub gap: f32,
    /// Project cards in document order.
    pub cards: Vec<CardFixture>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            reduced_motion: false,
            intersection: true,
            autoplay_blocked: false,
            hero: true,
            mobile_menu: true,
            grid_top: 900.0,
            card_height: 300.0,
            gap: 24.0,
            cards: Vec::new(),
        }
    }
}

/// Element handles of a built fixture page.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    /// Hero block, if any.
    pub hero: Option<ElementId>,
    /// Filter bar controls, `all` first.
    pub controls: Vec<ElementId>,
    /// Mobile filter menu, if any.
    pub menu: Option<ElementId>,
    /// Mobile filter menu toggle, if any.
    pub menu_toggle: Option<ElementId>,
    /// Project grid.
    pub grid: Option<ElementId>,
    /// Project cards.
    pub cards: Vec<ElementId>,
    /// Image layer of each card.
    pub images: Vec<ElementId>,
    /// Video of each card, if any.
    pub videos: Vec<Option<ElementId>>,
}

impl FixturePage {
    /// Filter bar control carrying `value`.
    #[must_use]
    pub fn control(&self, dom: &MemoryDom, attr: &str, value: &str) -> Option<ElementId> {
        self.controls
            .iter()
            .copied()
            .find(|c| dom.attribute(*c, attr).as_deref() == Some(value))
    }
}

impl PageFixture {
    /// Parse a fixture from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, SiteError> {
        toml::from_str(text).map_err(|e| SiteError::FixtureParse(e.to_string()))
    }

    /// Load a fixture from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Distinct categories in first-appearance order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tag in self.cards.iter().flat_map(|c| c.categories.split_whitespace()) {
            if !out.iter().any(|t| t == tag) {
                out.push(tag.to_owned());
            }
        }
        out
    }

    /// Build the document.
    #[must_use]
    pub fn build(&self, options: &SiteOptions) -> (MemoryDom, FixturePage) {
        let m = &options.markers;
        let mut dom = MemoryDom::new(self.viewport);
        dom.set_reduced_motion(self.reduced_motion);
        dom.set_intersection_support(self.intersection);
        dom.block_autoplay(self.autoplay_blocked);

        let intent = m
            .intent_classes
            .first()
            .map_or("fade-up", String::as_str);
        let width = self.viewport.width;
        let mut page = FixturePage::default();

        if self.hero {
            let hero = dom.create(None, &[intent]);
            dom.set_rect(hero, Rect::new(0.0, 120.0, width, 400.0));
            page.hero = Some(hero);
        }

        let mut values = vec![ALL.to_owned()];
        values.extend(self.categories());
        for value in &values {
            let control = dom.create(None, &["filter-btn"]);
            dom.set_attribute(control, &m.filter_attr, value);
            page.controls.push(control);
        }
        if self.mobile_menu {
            let toggle = dom.create(None, &[m.filter_menu_toggle_class.as_str()]);
            dom.set_attribute(toggle, "aria-expanded", "false");
            let menu = dom.create(None, &[m.filter_menu_class.as_str()]);
            for value in &values {
                let control = dom.create(Some(menu), &["filter-btn"]);
                dom.set_attribute(control, &m.filter_attr, value);
            }
            page.menu = Some(menu);
            page.menu_toggle = Some(toggle);
        }

        let columns = options.layout.column_count(width);
        let rows = self.cards.len().div_ceil(columns.max(1));
        let pitch = self.card_height + self.gap;
        let grid = dom.create(None, &[m.grid_class.as_str()]);
        dom.set_rect(
            grid,
            Rect::new(0.0, self.grid_top, width, rows as f32 * pitch),
        );
        page.grid = Some(grid);

        let card_width =
            (width - self.gap * (columns as f32 + 1.0)) / columns as f32;
        for (i, entry) in self.cards.iter().enumerate() {
            let (row, col) = (i / columns, i % columns);
            let rect = Rect::new(
                self.gap + col as f32 * (card_width + self.gap),
                self.grid_top + row as f32 * pitch,
                card_width,
                self.card_height,
            );
            let card = dom.create(Some(grid), &[m.card_class.as_str(), intent]);
            dom.set_attribute(card, &m.card_category_attr, &entry.categories);
            dom.set_rect(card, rect);

            let image = dom.create(Some(card), &[m.card_image_class.as_str()]);
            dom.set_rect(image, rect);
            let video = entry.video.then(|| {
                let video =
                    dom.create_video(Some(image), &[m.card_video_class.as_str()]);
                dom.set_rect(video, rect);
                video
            });
            log::debug!("fixture card {card} '{}' [{}]", entry.title, entry.categories);

            page.cards.push(card);
            page.images.push(image);
            page.videos.push(video);
        }
        (dom, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Query;

    const PAGE: &str = r#"
viewport = { width = 1400.0, height = 900.0 }

[[cards]]
title = "Shop"
categories = "web design"

[[cards]]
title = "Logo"
categories = "design"

[[cards]]
title = "Reel"
categories = "video"
video = true
"#;

    #[test]
    fn parses_and_builds_markup() {
        let fixture = PageFixture::from_toml(PAGE).unwrap();
        assert_eq!(fixture.categories(), vec!["web", "design", "video"]);

        let options = SiteOptions::default();
        let (mut dom, page) = fixture.build(&options);
        assert_eq!(page.cards.len(), 3);
        assert_eq!(page.controls.len(), 4);
        assert!(page.videos[2].is_some());
        assert!(page.videos[0].is_none());

        // Bar and mobile menu both carry controls.
        let controls = dom.query_all(Query::Attribute("data-filter"));
        assert_eq!(controls.len(), 8);

        // Three columns on desktop: all cards on one row.
        let tops: Vec<f32> = page.cards.iter().map(|c| dom.bounding_rect(*c).top).collect();
        assert_eq!(tops, vec![900.0, 900.0, 900.0]);
        assert!(page.control(&dom, "data-filter", "video").is_some());
    }

    #[test]
    fn narrow_viewport_stacks_cards() {
        let mut fixture = PageFixture::from_toml(PAGE).unwrap();
        fixture.viewport = Viewport::new(600.0, 800.0);
        let (dom, page) = fixture.build(&SiteOptions::default());
        let tops: Vec<f32> = page.cards.iter().map(|c| dom.bounding_rect(*c).top).collect();
        assert_eq!(tops, vec![900.0, 1224.0, 1548.0]);
    }

    #[test]
    fn malformed_fixture_is_an_error() {
        let err = PageFixture::from_toml("cards = 3").unwrap_err();
        assert!(matches!(err, SiteError::FixtureParse(_)));
    }
}
