use serde::{Deserialize, Serialize};

/// The six animation-intent classes recognized by default.
pub const DEFAULT_INTENT_CLASSES: [&str; 6] = [
    "fade-up",
    "fade-in",
    "fade-down",
    "scale-in",
    "slide-left",
    "slide-right",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Class and attribute names forming the markup contract.
pub struct MarkerOptions {
    /// Classes marking animatable elements.
    pub intent_classes: Vec<String>,
    /// Class marking responsive grid containers.
    pub grid_class: String,
    /// Class marking project cards.
    pub card_class: String,
    /// Card attribute holding space-separated category tags.
    pub card_category_attr: String,
    /// Class of the card's image layer (still image or video wrapper).
    pub card_image_class: String,
    /// Class of a card's looping video.
    pub card_video_class: String,
    /// Attribute on filter controls holding their category tag.
    pub filter_attr: String,
    /// Class of the mobile filter menu.
    pub filter_menu_class: String,
    /// Class of the button opening the mobile filter menu.
    pub filter_menu_toggle_class: String,
    /// Class set on revealed elements.
    pub revealed_class: String,
    /// Class set on filtered-out cards.
    pub hidden_class: String,
    /// Class set on the active filter control.
    pub active_class: String,
    /// Class set on the mobile filter menu while open.
    pub menu_open_class: String,
    /// Class set on a hovered card.
    pub hover_class: String,
    /// Class toggled on the centered card on mobile.
    pub flipped_class: String,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            intent_classes: DEFAULT_INTENT_CLASSES
                .iter()
                .map(|c| (*c).to_owned())
                .collect(),
            grid_class: "projects-grid".to_owned(),
            card_class: "project-card".to_owned(),
            card_category_attr: "data-category".to_owned(),
            card_image_class: "project-image".to_owned(),
            card_video_class: "project-video".to_owned(),
            filter_attr: "data-filter".to_owned(),
            filter_menu_class: "filter-menu".to_owned(),
            filter_menu_toggle_class: "filter-menu-toggle".to_owned(),
            revealed_class: "visible".to_owned(),
            hidden_class: "hidden".to_owned(),
            active_class: "active".to_owned(),
            menu_open_class: "open".to_owned(),
            hover_class: "is-hovered".to_owned(),
            flipped_class: "flipped".to_owned(),
        }
    }
}
