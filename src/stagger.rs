//! Column-aware stagger delays for grid reveals.
//!
//! Each visible card gets `(visible_index % columns) * step` of extra
//! transition delay, so every row cascades left to right. Cards hidden by
//! the filter do not take a slot.

use std::time::Duration;

use crate::dom::{Dom, ElementId};
use crate::options::{LayoutOptions, SiteOptions};

/// Inline style property carrying the stagger delay.
pub const DELAY_PROPERTY: &str = "transition-delay";

/// CSS value for a delay, in whole milliseconds.
#[must_use]
pub fn format_delay(delay: Duration) -> String {
    format!("{}ms", delay.as_millis())
}

/// Assigns stagger delays to the visible children of grid containers.
#[derive(Debug, Clone)]
pub struct StaggerScheduler {
    step: Duration,
    layout: LayoutOptions,
}

impl StaggerScheduler {
    /// Scheduler with an explicit step and breakpoint table.
    #[must_use]
    pub fn new(step: Duration, layout: LayoutOptions) -> Self {
        Self { step, layout }
    }

    /// Scheduler configured from site options.
    #[must_use]
    pub fn from_options(options: &SiteOptions) -> Self {
        Self::new(options.reveal.stagger_step(), options.layout.clone())
    }

    /// Delay added per column.
    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Column count for a viewport width.
    #[must_use]
    pub fn column_count(&self, width: f32) -> usize {
        self.layout.column_count(width)
    }

    /// Delay for the card at `visible_index` in a grid of `columns`.
    #[must_use]
    pub fn delay_for(&self, visible_index: usize, columns: usize) -> Duration {
        self.step
            .saturating_mul((visible_index % columns.max(1)) as u32)
    }

    /// Assign delays to the children of `container` and return the delays
    /// given to visible children, in order. Hidden children lose any delay.
    ///
    /// No-op for an absent container. Re-running with an unchanged document
    /// yields the same delays.
    pub fn apply(
        &self,
        dom: &mut dyn Dom,
        container: Option<ElementId>,
    ) -> Vec<Duration> {
        let Some(container) = container else {
            return Vec::new();
        };
        let columns = self.column_count(dom.viewport().width);
        let mut assigned = Vec::new();
        for child in dom.children(container) {
            if dom.is_displayed(child) {
                let delay = self.delay_for(assigned.len(), columns);
                dom.set_style(child, DELAY_PROPERTY, &format_delay(delay));
                assigned.push(delay);
            } else {
                dom.remove_style(child, DELAY_PROPERTY);
            }
        }
        log::debug!(
            "stagger {container}: {} visible cards over {columns} columns",
            assigned.len()
        );
        assigned
    }
}
