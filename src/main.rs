//! `folio-motion` rehearsal: replays a scroll, filter and hover session
//! against a page fixture and logs what the motion core did.
//!
//! ```text
//! RUST_LOG=info folio-motion demos/portfolio.toml web --options motion.toml
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use folio_motion::dom::{Dom, FixturePage, MemoryDom, PageFixture};
use folio_motion::error::SiteError;
use folio_motion::options::SiteOptions;
use folio_motion::reveal::RevealState;
use folio_motion::site::{Site, SiteEvent};

/// Replay a scroll, filter and hover session against a page fixture.
#[derive(Debug, Parser)]
#[command(name = "folio-motion", version, about)]
struct Args {
    /// Page fixture (TOML).
    page: PathBuf,
    /// Category to select after scrolling.
    category: Option<String>,
    /// Site options file (TOML).
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,
}

fn summarize(site: &Site<MemoryDom>, page: &FixturePage, label: &str) {
    let revealed = page
        .cards
        .iter()
        .filter(|c| site.reveal().state(**c) == Some(RevealState::Revealed))
        .count();
    let displayed = page
        .cards
        .iter()
        .filter(|c| site.dom().is_displayed(**c))
        .count();
    log::info!(
        "{label}: {revealed}/{} cards revealed, {displayed} displayed, {} observed",
        page.cards.len(),
        site.reveal().observed_count()
    );
}

fn rehearse(args: &Args) -> Result<(), SiteError> {
    let options = match &args.options {
        Some(path) => SiteOptions::load(path)?,
        None => SiteOptions::default(),
    };
    let fixture = PageFixture::load(&args.page)?;
    let (dom, page) = fixture.build(&options);
    let filter_attr = options.markers.filter_attr.clone();

    let mut site = Site::new(dom, options);
    site.start();
    site.run_for(Duration::from_millis(50));
    summarize(&site, &page, "load");

    // Scroll to the bottom a screen at a time.
    let step = fixture.viewport.height * 0.5;
    let bottom = page
        .cards
        .iter()
        .map(|c| site.dom().bounding_rect(*c).bottom() + site.dom().scroll_y())
        .fold(0.0_f32, f32::max);
    let mut y = 0.0;
    while y < bottom {
        y += step;
        site.dom_mut().scroll_to(y);
        site.handle_event(SiteEvent::Scroll);
        site.run_for(Duration::from_millis(100));
    }
    summarize(&site, &page, "scrolled");
    site.dom_mut().scroll_to(0.0);
    site.handle_event(SiteEvent::Scroll);

    if let Some(category) = &args.category {
        let control = page.control(site.dom(), &filter_attr, category).ok_or_else(|| {
            SiteError::MissingMarkup(format!("no filter control for '{category}'"))
        })?;
        site.handle_event(SiteEvent::FilterClick { control });
        site.run_for(Duration::from_millis(700));
        for signal in site.take_signals() {
            log::info!("signal: {}", signal.event_name());
        }
        summarize(&site, &page, &format!("filter '{category}'"));
    }

    if let Some(&card) = page
        .cards
        .iter()
        .find(|c| site.dom().is_displayed(**c))
    {
        let rect = site.dom().bounding_rect(card);
        site.handle_event(SiteEvent::PointerEnter { card });
        site.pointer_move(card, rect.right(), rect.bottom());
        site.run_for(Duration::from_millis(800));
        let offset = site.parallax().offset(card);
        log::info!("hover {card}: image offset ({:.2}, {:.2})", offset.x, offset.y);
        site.handle_event(SiteEvent::PointerLeave { card });
        for video in site.dom_mut().take_pause_events() {
            site.handle_event(SiteEvent::VideoPaused { video });
        }
        log::info!(
            "left {card}: offset ({:.2}, {:.2}), {} frame callbacks pending",
            site.parallax().offset(card).x,
            site.parallax().offset(card).y,
            site.scheduler().pending_frames()
        );
    }

    site.shutdown();
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = rehearse(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn options_flag_may_follow_positionals() {
        let args = Args::try_parse_from([
            "folio-motion",
            "page.toml",
            "web",
            "--options",
            "motion.toml",
        ])
        .unwrap();
        assert_eq!(args.page, PathBuf::from("page.toml"));
        assert_eq!(args.category.as_deref(), Some("web"));
        assert_eq!(args.options, Some(PathBuf::from("motion.toml")));
    }

    #[test]
    fn page_is_required() {
        assert!(Args::try_parse_from(["folio-motion"]).is_err());
    }
}
