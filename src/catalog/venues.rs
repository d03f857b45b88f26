use std::collections::HashMap;
use url::Url;

use crate::types::{EventItem, Venue};

const MAPS_SEARCH: &str = "https://www.google.com/maps/search/";

/// Venue lookup built once per process from the venues file.
///
/// Entries are never invalidated; the index lives as long as the catalog
/// that owns it.
#[derive(Debug, Clone, Default)]
pub struct VenueIndex {
    venues: Vec<Venue>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl VenueIndex {
    pub fn new(venues: Vec<Venue>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for (idx, venue) in venues.iter().enumerate() {
            if !venue.id.is_empty() {
                by_id.entry(venue.id.to_lowercase()).or_insert(idx);
            }
            if !venue.name.is_empty() {
                by_name.entry(venue.name.to_lowercase()).or_insert(idx);
            }
        }
        Self { venues, by_id, by_name }
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Resolve a `venueId`, falling back to a case-insensitive name match
    pub fn get(&self, key: &str) -> Option<&Venue> {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.by_id
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .map(|&idx| &self.venues[idx])
    }

    /// Display name for an event's venue
    pub fn label(&self, event: &EventItem) -> String {
        match self.get(&event.venue_id) {
            Some(venue) => venue.name.clone(),
            None if !event.venue_id.trim().is_empty() => event.venue_id.replace('-', " "),
            None => "Venue".to_string(),
        }
    }

    /// Map search link: coordinates when known, otherwise the venue's name
    pub fn maps_url(&self, venue_id: &str) -> String {
        let query = match self.get(venue_id) {
            Some(venue) => match (venue.lat, venue.lng) {
                (Some(lat), Some(lng)) => format!("{lat},{lng}"),
                _ => venue.name.clone(),
            },
            None => venue_id.replace('-', " ").trim().to_string(),
        };
        if query.is_empty() {
            return "https://www.google.com/maps".to_string();
        }
        match Url::parse_with_params(MAPS_SEARCH, &[("api", "1"), ("query", query.as_str())]) {
            Ok(url) => url.to_string(),
            Err(_) => "https://www.google.com/maps".to_string(),
        }
    }
}
