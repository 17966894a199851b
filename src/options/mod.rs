//! Centralized site motion options with TOML and JSON support.
//!
//! All tweakable settings (breakpoints, reveal timing, filter transition,
//! parallax tuning, mobile flip cadence, markup markers) are consolidated
//! here. Natively they load from TOML; the web build reads JSON embedded in
//! the page.

mod layout;
mod markers;
mod motion;
mod parallax;

use std::path::Path;

pub use layout::LayoutOptions;
pub use markers::{MarkerOptions, DEFAULT_INTENT_CLASSES};
pub use motion::{FilterOptions, RevealOptions, MAX_STAGGER_STEP_SECS};
pub use parallax::{FlipOptions, ParallaxOptions};
use serde::{Deserialize, Serialize};

use crate::error::SiteError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial files (e.g. only overriding `[parallax]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SiteOptions {
    /// Grid breakpoints and resize debounce.
    pub layout: LayoutOptions,
    /// Scroll reveal parameters.
    pub reveal: RevealOptions,
    /// Category filter transition timing.
    pub filter: FilterOptions,
    /// Card parallax tuning.
    pub parallax: ParallaxOptions,
    /// Mobile card flip cadence.
    pub flip: FlipOptions,
    /// Markup contract.
    pub markers: MarkerOptions,
}

impl SiteOptions {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let content = std::fs::read_to_string(path).map_err(SiteError::Io)?;
        toml::from_str(&content)
            .map_err(|e| SiteError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SiteError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SiteError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SiteError::Io)?;
        }
        std::fs::write(path, content).map_err(SiteError::Io)
    }

    /// Parse options from JSON (as embedded in a page). Missing fields use
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, SiteError> {
        serde_json::from_str(json)
            .map_err(|e| SiteError::OptionsParse(e.to_string()))
    }

    /// Copy with out-of-range values pulled back to something usable.
    ///
    /// Non-finite or non-positive tuning values fall back to their defaults;
    /// fractions are clamped into `[0, 1]`; breakpoints are reordered if the
    /// desktop one sits below the tablet one.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let p = &mut self.parallax;
        if !(p.blend.is_finite() && p.blend > 0.0) {
            p.blend = defaults.parallax.blend;
        }
        p.blend = p.blend.min(1.0);
        if !(p.epsilon_px.is_finite() && p.epsilon_px > 0.0) {
            p.epsilon_px = defaults.parallax.epsilon_px;
        }
        if !p.max_offset_px.is_finite() {
            p.max_offset_px = defaults.parallax.max_offset_px;
        }
        if !(p.image_scale.is_finite() && p.image_scale > 0.0) {
            p.image_scale = defaults.parallax.image_scale;
        }

        let r = &mut self.reveal;
        r.stagger_step_secs = if r.stagger_step_secs.is_finite() {
            r.stagger_step_secs.clamp(0.0, MAX_STAGGER_STEP_SECS)
        } else {
            defaults.reveal.stagger_step_secs
        };
        r.observer_threshold = if r.observer_threshold.is_finite() {
            r.observer_threshold.clamp(0.0, 1.0)
        } else {
            defaults.reveal.observer_threshold
        };
        if !r.observer_bottom_margin_px.is_finite() {
            r.observer_bottom_margin_px =
                defaults.reveal.observer_bottom_margin_px;
        }

        let l = &mut self.layout;
        if l.desktop_min_width < l.tablet_min_width {
            std::mem::swap(&mut l.desktop_min_width, &mut l.tablet_min_width);
        }

        if self.markers.intent_classes.is_empty() {
            self.markers.intent_classes = defaults.markers.intent_classes;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = SiteOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: SiteOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[parallax]
max_offset_px = 8.0
";
        let opts: SiteOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.parallax.max_offset_px, 8.0);
        // Everything else should be default
        assert_eq!(opts.parallax.blend, 0.15);
        assert_eq!(opts.filter.transition_ms, 300);
        assert_eq!(opts.markers.intent_classes.len(), 6);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let opts = SiteOptions::from_json(
            r#"{ "markers": { "card_class": "work-card" } }"#,
        )
        .unwrap();
        assert_eq!(opts.markers.card_class, "work-card");
        assert_eq!(opts.markers.grid_class, "projects-grid");
        assert_eq!(opts.layout.resize_debounce_ms, 150);
    }

    #[test]
    fn malformed_json_is_an_options_error() {
        let err = SiteOptions::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SiteError::OptionsParse(_)));
    }

    #[test]
    fn column_count_breakpoints() {
        let layout = LayoutOptions::default();
        assert_eq!(layout.column_count(320.0), 1);
        assert_eq!(layout.column_count(767.9), 1);
        assert_eq!(layout.column_count(768.0), 2);
        assert_eq!(layout.column_count(1023.0), 2);
        assert_eq!(layout.column_count(1024.0), 3);
        assert_eq!(layout.column_count(1400.0), 3);
    }

    #[test]
    fn sanitized_repairs_bad_values() {
        let mut opts = SiteOptions::default();
        opts.parallax.blend = 0.0;
        opts.parallax.epsilon_px = f32::NAN;
        opts.reveal.observer_threshold = 3.0;
        opts.layout.tablet_min_width = 1200.0;
        opts.layout.desktop_min_width = 800.0;
        opts.markers.intent_classes.clear();

        let opts = opts.sanitized();
        assert_eq!(opts.parallax.blend, 0.15);
        assert_eq!(opts.parallax.epsilon_px, 0.01);
        assert_eq!(opts.reveal.observer_threshold, 1.0);
        assert_eq!(opts.layout.tablet_min_width, 800.0);
        assert_eq!(opts.layout.desktop_min_width, 1200.0);
        assert_eq!(opts.markers.intent_classes.len(), 6);
    }

    #[test]
    fn oversized_stagger_step_is_clamped() {
        let opts =
            SiteOptions::from_json(r#"{"reveal":{"stagger_step_secs":1e30}}"#)
                .unwrap()
                .sanitized();
        assert_eq!(opts.reveal.stagger_step_secs, MAX_STAGGER_STEP_SECS);
        assert_eq!(opts.reveal.stagger_step(), Duration::from_secs(10));

        let mut negative = SiteOptions::default();
        negative.reveal.stagger_step_secs = -2.0;
        assert_eq!(negative.sanitized().reveal.stagger_step_secs, 0.0);
    }

    #[test]
    fn unsanitized_stagger_step_falls_back_to_default() {
        let fallback = RevealOptions::default().stagger_step();
        let mut opts = SiteOptions::default();
        opts.reveal.stagger_step_secs = 1e30;
        assert_eq!(opts.reveal.stagger_step(), fallback);
        opts.reveal.stagger_step_secs = f32::NAN;
        assert_eq!(opts.reveal.stagger_step(), fallback);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join("folio-motion-options-test");
        let path = dir.join("site.toml");
        let mut opts = SiteOptions::default();
        opts.flip.interval_ms = 1500;
        opts.save(&path).unwrap();
        let loaded = SiteOptions::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_file(&path);
    }
}
