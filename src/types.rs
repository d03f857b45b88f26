use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// One entry of the venue archive listing, before enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct VenueStub {
    pub id: String,
    pub name: String,
    pub detail_url: Option<String>,
}

impl VenueStub {
    pub fn new(name: impl Into<String>, detail_url: Option<String>) -> Self {
        let name = name.into();
        Self {
            id: slugify(&name),
            name,
            detail_url,
        }
    }
}

/// One row of the chronological programme listing, before enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct ProgrammeStub {
    pub href: String,
    pub title: String,
    pub section: Option<String>,
    pub venue_name: Option<String>,
    /// Time of day as `HH:MM`
    pub start: String,
}

/// Fields a venue detail page may contribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueDetails {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
}

/// Fields a programme detail page may contribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgrammeDetails {
    pub category: Option<String>,
    pub language: Option<String>,
    pub age_restriction: Option<String>,
    pub duration_min: Option<u32>,
    pub venue_name: Option<String>,
    pub times: Vec<ShowTime>,
    pub ticket_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowTime {
    /// `YYYY-MM-DD`, or empty when only the time of day is known
    #[serde(rename = "dateISO", default)]
    pub date_iso: String,
    #[serde(default)]
    pub time: String,
}

impl ShowTime {
    pub fn new(date_iso: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date_iso: date_iso.into(),
            time: time.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Venue {
    pub fn from_stub(stub: VenueStub) -> Self {
        Self {
            id: stub.id,
            name: stub.name,
            detail_url: stub.detail_url,
            lat: None,
            lng: None,
            address: None,
        }
    }

    pub fn apply(&mut self, details: VenueDetails) {
        if let (Some(lat), Some(lng)) = (details.lat, details.lng) {
            self.lat = Some(lat);
            self.lng = Some(lng);
        }
        if details.address.is_some() {
            self.address = details.address;
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u32>,
    pub venue_id: String,
    pub times: Vec<ShowTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub detail_url: String,
}

impl EventItem {
    /// Build the final item for a stub, using detail-page fields when the
    /// enrichment succeeded and listing-level fields otherwise.
    pub fn from_stub(stub: ProgrammeStub, details: Option<ProgrammeDetails>) -> Self {
        let fallback_times = || vec![ShowTime::new("", stub.start.clone())];

        match details {
            Some(details) => {
                let venue_name = details
                    .venue_name
                    .as_deref()
                    .or(stub.venue_name.as_deref())
                    .unwrap_or_default();
                let times = if details.times.is_empty() {
                    fallback_times()
                } else {
                    details.times
                };
                Self {
                    id: slugify(&stub.title),
                    venue_id: slugify(venue_name),
                    category: details.category.or(stub.section),
                    language: details.language,
                    age_restriction: details.age_restriction,
                    duration_min: details.duration_min,
                    times,
                    ticket_url: details.ticket_url,
                    title: stub.title,
                    detail_url: stub.href,
                }
            }
            None => Self {
                id: slugify(&stub.title),
                venue_id: slugify(stub.venue_name.as_deref().unwrap_or_default()),
                category: stub.section,
                language: None,
                age_restriction: None,
                duration_min: None,
                times: fallback_times(),
                ticket_url: None,
                title: stub.title,
                detail_url: stub.href,
            },
        }
    }

    /// Composite key combining showings of one production at one venue
    pub fn merge_key(&self) -> String {
        format!("{}::{}", self.id, self.venue_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stub() -> ProgrammeStub {
        ProgrammeStub {
            href: "https://woordfees.co.za/en/program/n-begin/".into(),
            title: "’n Begin".into(),
            section: Some("Theatre".into()),
            venue_name: Some("Idas Valley Primary".into()),
            start: "13:00".into(),
        }
    }

    #[test]
    fn test_from_stub_without_details_uses_listing_fields() {
        let item = EventItem::from_stub(stub(), None);
        assert_eq!(item.id, "n-begin");
        assert_eq!(item.venue_id, "idas-valley-primary");
        assert_eq!(item.category.as_deref(), Some("Theatre"));
        assert_eq!(item.times, vec![ShowTime::new("", "13:00")]);
        assert_eq!(item.merge_key(), "n-begin::idas-valley-primary");
    }

    #[test]
    fn test_from_stub_prefers_detail_fields() {
        let details = ProgrammeDetails {
            category: Some("Drama".into()),
            venue_name: Some("HB Thom".into()),
            duration_min: Some(70),
            times: vec![ShowTime::new("2025-10-16", "13:00")],
            ..Default::default()
        };
        let item = EventItem::from_stub(stub(), Some(details));
        assert_eq!(item.category.as_deref(), Some("Drama"));
        assert_eq!(item.venue_id, "hb-thom");
        assert_eq!(item.duration_min, Some(70));
        assert_eq!(item.times, vec![ShowTime::new("2025-10-16", "13:00")]);
    }

    #[test]
    fn test_from_stub_with_empty_detail_times_falls_back_to_start() {
        let item = EventItem::from_stub(stub(), Some(ProgrammeDetails::default()));
        assert_eq!(item.times, vec![ShowTime::new("", "13:00")]);
        // listing section survives when the detail page has no category
        assert_eq!(item.category.as_deref(), Some("Theatre"));
    }

    #[test]
    fn test_event_serializes_camel_case_and_skips_absent_fields() {
        let item = EventItem::from_stub(stub(), None);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "n-begin",
                "title": "’n Begin",
                "category": "Theatre",
                "venueId": "idas-valley-primary",
                "times": [{ "dateISO": "", "time": "13:00" }],
                "detailUrl": "https://woordfees.co.za/en/program/n-begin/"
            })
        );
    }

    #[test]
    fn test_venue_apply_requires_both_coordinates() {
        let mut venue = Venue::from_stub(VenueStub::new("Erfurthuis", None));
        venue.apply(VenueDetails {
            lat: Some(-33.93),
            lng: None,
            address: Some("37 Ryneveld St".into()),
        });
        assert!(!venue.has_coordinates());
        assert_eq!(venue.address.as_deref(), Some("37 Ryneveld St"));
    }
}
