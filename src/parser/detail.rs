use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use url::Url;

use super::time::{find_day_month, find_iso_date, find_time_of_day};
use super::{collapsed_text, non_empty, selector, text_of};
use crate::error::Result;
use crate::types::{ProgrammeDetails, ShowTime, VenueDetails};

// Embedded-map form first (".../@-33.93,18.86,15z"), then any "lat,lng" pair
static MAP_AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid map regex"));
static LAT_LNG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(-?\d+\.\d+)[,\s]+(-?\d+\.\d+)").expect("valid lat/lng regex"));
static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*min").expect("valid duration regex"));

/// Pull `(lat, lng)` out of a map link; the first matching pattern wins.
pub fn extract_coordinates(href: &str) -> Option<(f64, f64)> {
    [&*MAP_AT_RE, &*LAT_LNG_RE].iter().find_map(|re| {
        let caps = re.captures(href)?;
        let lat: f64 = caps[1].parse().ok()?;
        let lng: f64 = caps[2].parse().ok()?;
        Some((lat, lng))
    })
}

pub fn parse_venue_detail(html: &str, _base: &Url) -> Result<VenueDetails> {
    let document = Html::parse_document(html);
    let map_sel = selector("a[href*='google.com/maps'], a[href^='geo:']")?;
    let address_sel = selector("address")?;
    let content_sel = selector(".single-venue__content p")?;

    let map_link = document
        .select(&map_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default();
    let coordinates = extract_coordinates(map_link);

    let root = document.root_element();
    let address = non_empty(text_of(root, &address_sel)).or_else(|| {
        document
            .select(&content_sel)
            .next()
            .and_then(|p| non_empty(p.text().collect::<String>().trim().to_string()))
    });

    Ok(VenueDetails {
        lat: coordinates.map(|(lat, _)| lat),
        lng: coordinates.map(|(_, lng)| lng),
        address,
    })
}

/// Reads the meta list, show dates and ticket link of a programme page
#[derive(Debug, Clone, Copy)]
pub struct ProgrammeDetailParser {
    /// Year used for date entries written as "16 Oktober"
    pub festival_year: i32,
}

impl ProgrammeDetailParser {
    pub fn new(festival_year: i32) -> Self {
        Self { festival_year }
    }

    pub fn parse(&self, html: &str, _base: &Url) -> Result<ProgrammeDetails> {
        let document = Html::parse_document(html);
        let meta_sel = selector(".single-programme__meta li, li")?;
        let dates_sel = selector(".single-programme__dates li, .dates li")?;
        let ticket_sel = selector("a[href*='webtickets'], a[href*='quicket']")?;

        let mut details = ProgrammeDetails::default();

        // Later entries overwrite earlier ones, matching the page's own precedence
        for li in document.select(&meta_sel) {
            let text = collapsed_text(li);
            if let Some(value) = labelled(&text, "Category") {
                details.category = Some(value);
            }
            if let Some(value) = labelled(&text, "Language") {
                details.language = Some(value);
            }
            if let Some(value) = labelled(&text, "Age restriction") {
                details.age_restriction = Some(value);
            }
            if starts_with_ignore_case(&text, "Duration") {
                if let Some(minutes) = DURATION_RE
                    .captures(&text)
                    .and_then(|caps| caps[1].parse().ok())
                {
                    details.duration_min = Some(minutes);
                }
            }
            if let Some(value) = labelled(&text, "Venue") {
                details.venue_name = Some(value);
            }
        }

        for li in document.select(&dates_sel) {
            let text = collapsed_text(li);
            if let Some(show) = self.show_time(&text) {
                details.times.push(show);
            }
        }

        details.ticket_url = document
            .select(&ticket_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string());

        Ok(details)
    }

    fn show_time(&self, text: &str) -> Option<ShowTime> {
        let date = find_iso_date(text).or_else(|| find_day_month(text, self.festival_year));
        let time = find_time_of_day(text);
        if date.is_none() && time.is_none() {
            return None;
        }
        Some(ShowTime::new(date.unwrap_or_default(), time.unwrap_or_default()))
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Value of a "Label. value" meta entry, with the label and its dot removed
fn labelled(text: &str, label: &str) -> Option<String> {
    if !starts_with_ignore_case(text, label) {
        return None;
    }
    let rest = &text[label.len()..];
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    non_empty(rest.trim().to_string())
}
