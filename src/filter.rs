//! Category filtering of project cards.
//!
//! Selecting a category toggles each card's hidden class at once (driving
//! the CSS fade/scale), syncs `display` after one transition window so
//! hidden cards stop taking layout space, and after a second window
//! reports that the visible set changed so reveal can resynchronize.
//! A newer selection supersedes every timer of the previous one.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::dom::{Dom, ElementId, Query};
use crate::options::SiteOptions;
use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::site::SiteSignal;

/// Category value that shows every card.
pub const ALL: &str = "all";

/// Whether a card tagged with `tags` (space-separated) is shown while
/// `active` is selected.
#[must_use]
pub fn card_matches(active: &str, tags: &str) -> bool {
    active == ALL || tags.split_whitespace().any(|tag| tag == active)
}

/// The single active category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    active: String,
}

impl FilterState {
    /// Active category.
    #[must_use]
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Whether every card is shown.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.active == ALL
    }

    /// Whether a card tagged with `tags` is shown.
    #[must_use]
    pub fn shows(&self, tags: &str) -> bool {
        card_matches(&self.active, tags)
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active: ALL.to_owned(),
        }
    }
}

/// Where a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSource {
    /// The regular filter bar.
    Bar,
    /// The collapsible mobile filter menu.
    MobileMenu,
}

/// Owns the active category and every card's filter visibility.
#[derive(Debug)]
pub struct FilterController {
    filter_attr: String,
    category_attr: String,
    hidden_class: String,
    active_class: String,
    menu_class: String,
    menu_toggle_class: String,
    menu_open_class: String,
    transition: Duration,
    enabled: bool,
    state: FilterState,
    controls: Vec<ElementId>,
    cards: Vec<ElementId>,
    menu: Option<ElementId>,
    menu_toggle: Option<ElementId>,
    pending_display: FxHashMap<ElementId, TaskHandle>,
    pending_settle: Option<TaskHandle>,
}

impl FilterController {
    /// Controller configured from site options. Call [`init`](Self::init)
    /// once the document is ready.
    #[must_use]
    pub fn new(options: &SiteOptions) -> Self {
        let m = &options.markers;
        Self {
            filter_attr: m.filter_attr.clone(),
            category_attr: m.card_category_attr.clone(),
            hidden_class: m.hidden_class.clone(),
            active_class: m.active_class.clone(),
            menu_class: m.filter_menu_class.clone(),
            menu_toggle_class: m.filter_menu_toggle_class.clone(),
            menu_open_class: m.menu_open_class.clone(),
            transition: options.filter.transition(),
            enabled: false,
            state: FilterState::default(),
            controls: Vec::new(),
            cards: Vec::new(),
            menu: None,
            menu_toggle: None,
            pending_display: FxHashMap::default(),
            pending_settle: None,
        }
    }

    /// Find controls and cards. The page always starts on [`ALL`]; nothing
    /// is restored from storage.
    pub fn init(&mut self, dom: &mut dyn Dom) {
        self.controls = dom.query_all(Query::Attribute(&self.filter_attr));
        self.cards = dom.query_all(Query::Attribute(&self.category_attr));
        self.menu = dom.query_all(Query::Class(&self.menu_class)).first().copied();
        self.menu_toggle = dom
            .query_all(Query::Class(&self.menu_toggle_class))
            .first()
            .copied();
        self.state = FilterState::default();

        if self.controls.is_empty() || self.cards.is_empty() {
            log::warn!(
                "filter disabled: {} controls, {} cards",
                self.controls.len(),
                self.cards.len()
            );
            self.enabled = false;
            return;
        }
        self.enabled = true;
        self.sync_controls(dom);
        log::info!(
            "filter ready: {} controls, {} cards",
            self.controls.len(),
            self.cards.len()
        );
    }

    /// A filter control was clicked. Unknown controls are ignored.
    pub fn select_control(
        &mut self,
        dom: &mut dyn Dom,
        sched: &mut Scheduler,
        control: ElementId,
    ) {
        if !self.enabled || !self.controls.contains(&control) {
            return;
        }
        let Some(value) = dom.attribute(control, &self.filter_attr) else {
            return;
        };
        let source = match self.menu {
            Some(menu) if dom.contains(menu, control) => ControlSource::MobileMenu,
            _ => ControlSource::Bar,
        };
        self.select_category(dom, sched, &value, source);
    }

    /// Make `value` the active category, update every control's visual and
    /// ARIA state, close the mobile menu if the choice came from it, and
    /// filter the cards.
    pub fn select_category(
        &mut self,
        dom: &mut dyn Dom,
        sched: &mut Scheduler,
        value: &str,
        source: ControlSource,
    ) {
        if !self.enabled {
            return;
        }
        value.clone_into(&mut self.state.active);
        self.sync_controls(dom);
        if source == ControlSource::MobileMenu {
            self.close_menu(dom);
        }
        log::debug!("filter selected '{value}'");
        self.apply_filter(dom, sched);
    }

    /// Toggle card visibility for the active category and schedule the
    /// display sync and the change signal.
    pub fn apply_filter(&mut self, dom: &mut dyn Dom, sched: &mut Scheduler) {
        if !self.enabled {
            return;
        }
        for card in &self.cards {
            let tags = dom.attribute(*card, &self.category_attr).unwrap_or_default();
            let show = self.state.shows(&tags);
            dom.set_class(*card, &self.hidden_class, !show);

            if let Some(stale) = self.pending_display.remove(card) {
                let _ = sched.cancel(stale);
            }
            let handle = sched.set_timeout(
                self.transition,
                Task::FilterDisplay { card: *card, show },
            );
            let _ = self.pending_display.insert(*card, handle);
        }

        if let Some(stale) = self.pending_settle.take() {
            let _ = sched.cancel(stale);
        }
        self.pending_settle = Some(sched.set_timeout(
            self.transition.saturating_mul(2),
            Task::FilterSettled,
        ));
    }

    /// Display timer for `card` fired.
    pub fn on_display(&mut self, dom: &mut dyn Dom, card: ElementId, show: bool) {
        let _ = self.pending_display.remove(&card);
        if show {
            dom.remove_style(card, "display");
        } else {
            dom.set_style(card, "display", "none");
        }
    }

    /// Settle timer fired; returns the signal to broadcast.
    pub fn on_settled(&mut self) -> SiteSignal {
        self.pending_settle = None;
        log::debug!("filter '{}' settled", self.state.active);
        SiteSignal::FilterChanged
    }

    /// Cancel every pending timer.
    pub fn shutdown(&mut self, sched: &mut Scheduler) {
        for (_, handle) in self.pending_display.drain() {
            let _ = sched.cancel(handle);
        }
        if let Some(handle) = self.pending_settle.take() {
            let _ = sched.cancel(handle);
        }
    }

    /// Current filter state.
    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Whether the controller found its markup.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Filterable cards in document order.
    #[must_use]
    pub fn cards(&self) -> &[ElementId] {
        &self.cards
    }

    /// Filter controls in document order.
    #[must_use]
    pub fn controls(&self) -> &[ElementId] {
        &self.controls
    }

    /// Control carrying `value`, if any.
    pub fn control_for(&self, dom: &dyn Dom, value: &str) -> Option<ElementId> {
        self.controls
            .iter()
            .copied()
            .find(|c| dom.attribute(*c, &self.filter_attr).as_deref() == Some(value))
    }

    /// Number of display timers still pending.
    #[must_use]
    pub fn pending_display_count(&self) -> usize {
        self.pending_display.len()
    }

    fn sync_controls(&self, dom: &mut dyn Dom) {
        for control in &self.controls {
            let active = dom.attribute(*control, &self.filter_attr).as_deref()
                == Some(self.state.active());
            dom.set_class(*control, &self.active_class, active);
            dom.set_attribute(
                *control,
                "aria-pressed",
                if active { "true" } else { "false" },
            );
        }
    }

    fn close_menu(&self, dom: &mut dyn Dom) {
        if let Some(menu) = self.menu {
            dom.remove_class(menu, &self.menu_open_class);
        }
        if let Some(toggle) = self.menu_toggle {
            dom.set_attribute(toggle, "aria-expanded", "false");
        }
    }
}
