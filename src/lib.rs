// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Tests assert on known-good fixtures
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Motion core of a static portfolio site: scroll-triggered reveals,
//! column-aware stagger, category filtering and pointer parallax on
//! project cards.
//!
//! Everything runs single-threaded on callbacks. Controllers never hold
//! closures: deferred work is plain [`scheduler::Task`] data with
//! cancellable handles, and the document is reached only through the
//! [`dom::Dom`] port, so the same code drives a browser page (feature
//! `web`) and the in-memory [`dom::MemoryDom`] used by tests.
//!
//! # Key entry points
//!
//! - [`site::Site`] - owns the controllers and routes events and tasks
//! - [`reveal::RevealController`] - hidden → revealed, once per element
//! - [`filter::FilterController`] - active category and card visibility
//! - [`parallax::ParallaxEngine`] - per-card interpolated pointer offset
//! - [`options::SiteOptions`] - timing, breakpoints and markup markers
//!
//! # Data flow
//!
//! A filter click toggles card classes immediately, syncs `display` after
//! the transition, then emits [`site::SiteSignal::FilterChanged`]; the
//! runtime answers by resetting reveal, which re-staggers the grid and
//! re-partitions elements into "visible now" and "observe later" on the
//! next frame. Parallax is independent of both.

pub mod dom;
pub mod error;
pub mod filter;
pub mod options;
pub mod parallax;
pub mod reveal;
pub mod scheduler;
pub mod site;
pub mod stagger;
pub mod visibility;
#[cfg(feature = "web")]
pub mod web;
