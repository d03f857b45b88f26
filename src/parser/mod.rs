//! Structural HTML extraction for the festival site's listing and detail pages.
//!
//! Extraction is lossy by policy: entries missing a required field are dropped
//! rather than reported, so a partially changed template still yields data.

pub mod detail;
pub mod listing;
pub mod time;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, ScraperError};

pub use detail::{extract_coordinates, parse_venue_detail, ProgrammeDetailParser};
pub use listing::{parse_programme_listing, parse_venue_listing};
pub use time::{parse_time_range, TimeRange};

/// Stubs parsed from one listing page plus the absolute URL of the next page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage<S> {
    pub stubs: Vec<S>,
    pub next_url: Option<String>,
}

/// Listing parsers share this shape so the paginator can drive either one
pub type ListingParser<S> = fn(&str, &Url) -> Result<ListingPage<S>>;

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Selector(format!("{css:?}: {e:?}")))
}

/// All text below `element`, whitespace runs collapsed to single spaces
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Concatenated text of every descendant matching `sel`, trimmed
pub(crate) fn text_of(element: ElementRef<'_>, sel: &Selector) -> String {
    element
        .select(sel)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub(crate) fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}

/// Follow the `.pagination a.next` control, if the page has one
pub(crate) fn next_page_url(document: &Html, base: &Url) -> Result<Option<String>> {
    let next_sel = selector(".pagination a.next")?;
    Ok(document
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(base, href)))
}
