//! Crate-level error types.

use std::fmt;

/// Errors produced by the folio-motion crate.
///
/// Only setup can fail hard. Once a [`Site`](crate::site::Site) is running,
/// soft failures (missing markup, rejected playback) are logged and the
/// affected component degrades instead of returning an error.
#[derive(Debug)]
pub enum SiteError {
    /// Markup the caller insisted on is absent from the document.
    MissingMarkup(String),
    /// TOML/JSON options parsing or serialization failure.
    OptionsParse(String),
    /// Page fixture parsing failure.
    FixtureParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// A browser API call failed.
    Platform(String),
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMarkup(what) => write!(f, "missing markup: {what}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::FixtureParse(msg) => {
                write!(f, "page fixture parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Platform(msg) => write!(f, "platform error: {msg}"),
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SiteError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
