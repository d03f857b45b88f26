//! Read side of the asset files: what the festival app consumes.
//!
//! Loading never fails. A missing, empty or unreadable file is replaced by
//! built-in sample data so the app always has something to show.

pub mod adapters;
pub mod venues;

pub use adapters::{AdapterChain, SchemaAdapter};
pub use venues::VenueIndex;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::types::{EventItem, ShowTime, Venue};

/// Where the catalog's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    File,
    Sample,
}

/// An event paired with its resolved venue, if any
#[derive(Debug, Clone, Copy)]
pub struct JoinedEvent<'a> {
    pub event: &'a EventItem,
    pub venue: Option<&'a Venue>,
}

pub struct Catalog {
    pub venues: VenueIndex,
    pub events: Vec<EventItem>,
    pub venues_source: Source,
    pub events_source: Source,
}

impl Catalog {
    pub fn load(venues_path: &Path, programme_path: &Path) -> Self {
        Self::load_with(venues_path, &[programme_path], &AdapterChain::default())
    }

    /// Load venues from `venues_path` and events from the first programme
    /// candidate holding a non-empty array.
    pub fn load_with(venues_path: &Path, programme_candidates: &[&Path], chain: &AdapterChain) -> Self {
        let (venues, venues_source) = match read_array(venues_path)
            .map(|records| parse_venues(&records))
            .filter(|v| !v.is_empty())
        {
            Some(venues) => (venues, Source::File),
            None => {
                warn!(path = %venues_path.display(), "No venues available, using sample data");
                (sample_venues(), Source::Sample)
            }
        };

        let events = programme_candidates.iter().find_map(|path| {
            let records = read_array(path)?;
            let events = chain.adapt_all(&records);
            if events.is_empty() {
                None
            } else {
                debug!(path = %path.display(), events = events.len(), "Loaded programme");
                Some(events)
            }
        });
        let (events, events_source) = match events {
            Some(mut events) => {
                sort_by_start(&mut events);
                (dedup_by_id(events), Source::File)
            }
            None => {
                warn!("No programme available, using sample data");
                (sample_events(), Source::Sample)
            }
        };

        Self {
            venues: VenueIndex::new(venues),
            events,
            venues_source,
            events_source,
        }
    }

    pub fn joined(&self) -> Vec<JoinedEvent<'_>> {
        self.events
            .iter()
            .map(|event| JoinedEvent {
                event,
                venue: self.venues.get(&event.venue_id),
            })
            .collect()
    }

    /// Distinct `venueId`s no venue resolves, in first-seen order
    pub fn unmatched_venue_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .map(|e| e.venue_id.as_str())
            .filter(|id| self.venues.get(id).is_none())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn event(&self, id: &str) -> Option<&EventItem> {
        self.events.iter().find(|e| e.id == id)
    }
}

fn read_array(path: &Path) -> Option<Vec<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Asset file not readable");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(records)) if !records.is_empty() => Some(records),
        Ok(_) => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Asset file is not valid JSON");
            None
        }
    }
}

fn parse_venues(records: &[Value]) -> Vec<Venue> {
    records
        .iter()
        .filter_map(|r| serde_json::from_value::<Venue>(r.clone()).ok())
        .collect()
}

/// Earliest dated showing of an event; a date without a time means midnight
fn start_of(event: &EventItem) -> Option<NaiveDateTime> {
    event.times.iter().find_map(|show| {
        let date = NaiveDate::parse_from_str(&show.date_iso, "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(&show.time, "%H:%M").unwrap_or(NaiveTime::MIN);
        Some(date.and_time(time))
    })
}

/// Dated events first in start order, then undated ones by title. Stable.
fn sort_by_start(events: &mut [EventItem]) {
    events.sort_by(|a, b| match (start_of(a), start_of(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    });
}

fn dedup_by_id(events: Vec<EventItem>) -> Vec<EventItem> {
    let mut seen = HashSet::new();
    events.into_iter().filter(|e| seen.insert(e.id.clone())).collect()
}

fn sample_venues() -> Vec<Venue> {
    vec![
        Venue {
            id: "erfurthuis".into(),
            name: "Erfurthuis".into(),
            detail_url: None,
            lat: Some(-33.9368),
            lng: Some(18.8602),
            address: Some("37 Ryneveld Street, Stellenbosch".into()),
        },
        Venue {
            id: "hb-thom-teater".into(),
            name: "HB Thom Teater".into(),
            detail_url: None,
            lat: None,
            lng: None,
            address: None,
        },
    ]
}

fn sample_events() -> Vec<EventItem> {
    vec![EventItem {
        id: "woordfees-opening".into(),
        title: "Woordfees Opening".into(),
        category: Some("Festival".into()),
        language: Some("Afrikaans".into()),
        age_restriction: None,
        duration_min: Some(60),
        venue_id: "hb-thom-teater".into(),
        times: vec![ShowTime::new("", "19:00")],
        ticket_url: None,
        detail_url: String::new(),
    }]
}
