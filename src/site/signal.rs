//! Page-wide broadcasts emitted by the motion core.

/// A notification other page scripts may listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteSignal {
    /// The filter transition finished and the visible card set changed.
    FilterChanged,
}

impl SiteSignal {
    /// Name of the document event carrying this signal.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::FilterChanged => "filterChanged",
        }
    }
}

impl std::fmt::Display for SiteSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}
