//! Mapping of the programme file variants the app has shipped with onto
//! [`EventItem`].
//!
//! Each variant gets one named adapter. The chain tries them in order and the
//! first whose detection predicate matches does the mapping.

use serde_json::{Map, Value};

use crate::slug::slugify;
use crate::types::{EventItem, ShowTime};

type Object = Map<String, Value>;

pub trait SchemaAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `record` looks like this adapter's variant
    fn detects(&self, record: &Object) -> bool;

    /// Map a detected record; `None` when it lacks what the canonical model needs
    fn adapt(&self, record: &Object) -> Option<EventItem>;
}

/// This crate's own output: `times` list plus `venueId`
pub struct ScrapedAdapter;

/// camelCase rows with `detailUrl` / `ticketsUrl` and flat `date` + `time`
pub struct CamelCaseAdapter;

/// snake_case rows with `detail_url` / `tickets_url` / `venue_name`
pub struct SnakeCaseAdapter;

/// Rows with nested `links { detail, tickets }` and `venue { name, slug }`
pub struct NestedAdapter;

/// Anything else, mapped from whichever common keys are present
pub struct MinimalAdapter;

impl SchemaAdapter for ScrapedAdapter {
    fn name(&self) -> &'static str {
        "scraped"
    }

    fn detects(&self, record: &Object) -> bool {
        record.get("times").is_some_and(Value::is_array) && record.contains_key("venueId")
    }

    fn adapt(&self, record: &Object) -> Option<EventItem> {
        let mut item: EventItem = serde_json::from_value(Value::Object(record.clone())).ok()?;
        if item.times.is_empty() {
            return None;
        }
        if item.id.is_empty() {
            item.id = slugify(&item.title);
        }
        Some(item)
    }
}

impl SchemaAdapter for CamelCaseAdapter {
    fn name(&self) -> &'static str {
        "camel_case"
    }

    fn detects(&self, record: &Object) -> bool {
        record.contains_key("detailUrl") || record.contains_key("ticketsUrl")
    }

    fn adapt(&self, record: &Object) -> Option<EventItem> {
        let venue_slug = string(record, "venueSlug").or_else(|| string(record, "venue_slug"));
        let venue_name = string(record, "venueName").or_else(|| string(record, "venue_name"));
        Some(flat_item(
            record,
            venue_slug,
            venue_name,
            string(record, "detailUrl"),
            string(record, "ticketsUrl"),
        ))
    }
}

impl SchemaAdapter for SnakeCaseAdapter {
    fn name(&self) -> &'static str {
        "snake_case"
    }

    fn detects(&self, record: &Object) -> bool {
        ["detail_url", "tickets_url", "venue_name"]
            .iter()
            .any(|key| record.contains_key(*key))
    }

    fn adapt(&self, record: &Object) -> Option<EventItem> {
        Some(flat_item(
            record,
            string(record, "venue_slug"),
            string(record, "venue_name"),
            string(record, "detail_url"),
            string(record, "tickets_url"),
        ))
    }
}

impl SchemaAdapter for NestedAdapter {
    fn name(&self) -> &'static str {
        "nested"
    }

    fn detects(&self, record: &Object) -> bool {
        record.contains_key("links") || record.contains_key("venue")
    }

    fn adapt(&self, record: &Object) -> Option<EventItem> {
        let links = record.get("links").and_then(Value::as_object);
        let venue = record.get("venue").and_then(Value::as_object);
        Some(flat_item(
            record,
            venue.and_then(|v| string(v, "slug")),
            venue.and_then(|v| string(v, "name")),
            links.and_then(|l| string(l, "detail")),
            links.and_then(|l| string(l, "tickets")),
        ))
    }
}

impl SchemaAdapter for MinimalAdapter {
    fn name(&self) -> &'static str {
        "minimal"
    }

    fn detects(&self, _record: &Object) -> bool {
        true
    }

    fn adapt(&self, record: &Object) -> Option<EventItem> {
        let pick = |a: &str, b: &str| string(record, a).or_else(|| string(record, b));
        Some(flat_item(
            record,
            pick("venueSlug", "venue_slug"),
            pick("venueName", "venue_name"),
            pick("detailUrl", "detail_url"),
            pick("ticketsUrl", "tickets_url"),
        ))
    }
}

/// Ordered list of adapters; the first detecting adapter wins
pub struct AdapterChain {
    adapters: Vec<Box<dyn SchemaAdapter>>,
}

impl Default for AdapterChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ScrapedAdapter),
            Box::new(CamelCaseAdapter),
            Box::new(SnakeCaseAdapter),
            Box::new(NestedAdapter),
            Box::new(MinimalAdapter),
        ])
    }
}

impl AdapterChain {
    pub fn new(adapters: Vec<Box<dyn SchemaAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn select(&self, record: &Object) -> Option<&dyn SchemaAdapter> {
        self.adapters
            .iter()
            .find(|a| a.detects(record))
            .map(|a| a.as_ref())
    }

    /// Map one JSON value; non-objects and rejected records give `None`
    pub fn adapt(&self, record: &Value) -> Option<EventItem> {
        let object = record.as_object()?;
        self.select(object)?.adapt(object)
    }

    pub fn adapt_all(&self, records: &[Value]) -> Vec<EventItem> {
        records.iter().filter_map(|r| self.adapt(r)).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }
}

/// Trimmed, non-empty string value; numbers are stringified
fn string(record: &Object, key: &str) -> Option<String> {
    let text = match record.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn flat_item(
    record: &Object,
    venue_slug: Option<String>,
    venue_name: Option<String>,
    detail_url: Option<String>,
    ticket_url: Option<String>,
) -> EventItem {
    let title = string(record, "title").unwrap_or_else(|| "Untitled".to_string());
    let id = string(record, "id").unwrap_or_else(|| slugify(&title));
    let venue_id = venue_slug
        .map(|slug| slugify(&slug))
        .or_else(|| venue_name.map(|name| slugify(&name)))
        .unwrap_or_default();
    let date = string(record, "date").unwrap_or_default();
    let time = string(record, "time").unwrap_or_default();
    let duration_min = record
        .get("durationMin")
        .or_else(|| record.get("duration_minutes"))
        .and_then(Value::as_u64)
        .and_then(|m| u32::try_from(m).ok());

    EventItem {
        id,
        title,
        category: string(record, "category"),
        language: string(record, "language"),
        age_restriction: string(record, "ageRestriction").or_else(|| string(record, "age_restriction")),
        duration_min,
        venue_id,
        times: vec![ShowTime::new(date, time)],
        ticket_url,
        detail_url: detail_url.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_chain_order() {
        assert_eq!(
            AdapterChain::default().names(),
            vec!["scraped", "camel_case", "snake_case", "nested", "minimal"]
        );
    }

    #[test]
    fn test_scraped_rows_round_trip() {
        let chain = AdapterChain::default();
        let record = json!({
            "id": "n-begin",
            "title": "’n Begin",
            "venueId": "idas-valley-primary",
            "times": [{ "dateISO": "2025-10-16", "time": "13:00" }],
            "detailUrl": "https://woordfees.co.za/en/program/n-begin/"
        });

        assert_eq!(chain.select(&object(record.clone())).unwrap().name(), "scraped");
        let item = chain.adapt(&record).unwrap();
        assert_eq!(item.venue_id, "idas-valley-primary");
        assert_eq!(item.times, vec![ShowTime::new("2025-10-16", "13:00")]);
    }

    #[test]
    fn test_scraped_row_without_id_gets_slug_from_title() {
        let record = json!({
            "title": "Jazz op die Braak",
            "venueId": "boektent",
            "times": [{ "dateISO": "", "time": "18:00" }]
        });
        let item = AdapterChain::default().adapt(&record).unwrap();
        assert_eq!(item.id, "jazz-op-die-braak");
        assert_eq!(item.detail_url, "");
    }

    #[test]
    fn test_scraped_row_without_times_is_rejected() {
        let record = json!({ "id": "x", "title": "X", "venueId": "v", "times": [] });
        assert_eq!(AdapterChain::default().adapt(&record), None);
    }

    #[test]
    fn test_camel_case_variant() {
        let record = json!({
            "id": 42,
            "title": " Jazz in die Laan ",
            "date": "2025-10-17",
            "time": "18:30",
            "detailUrl": "https://woordfees.co.za/en/program/jazz/",
            "ticketsUrl": "https://quicket.co.za/events/1",
            "venueSlug": "Boektent"
        });
        let chain = AdapterChain::default();
        assert_eq!(chain.select(&object(record.clone())).unwrap().name(), "camel_case");

        let item = chain.adapt(&record).unwrap();
        assert_eq!(item.id, "42");
        assert_eq!(item.title, "Jazz in die Laan");
        assert_eq!(item.venue_id, "boektent");
        assert_eq!(item.times, vec![ShowTime::new("2025-10-17", "18:30")]);
        assert_eq!(item.ticket_url.as_deref(), Some("https://quicket.co.za/events/1"));
    }

    #[test]
    fn test_snake_case_variant() {
        let record = json!({
            "id": "kykNET-gesprek",
            "title": "kykNET Gesprek",
            "venue_name": "HB Thom Teater",
            "detail_url": "https://woordfees.co.za/en/program/gesprek/",
            "duration_minutes": 45
        });
        let chain = AdapterChain::default();
        assert_eq!(chain.select(&object(record.clone())).unwrap().name(), "snake_case");

        let item = chain.adapt(&record).unwrap();
        assert_eq!(item.venue_id, "hb-thom-teater");
        assert_eq!(item.duration_min, Some(45));
        assert_eq!(item.detail_url, "https://woordfees.co.za/en/program/gesprek/");
        assert_eq!(item.times, vec![ShowTime::new("", "")]);
    }

    #[test]
    fn test_nested_variant() {
        let record = json!({
            "id": "poesie",
            "title": "Poësie",
            "time": "11:00",
            "links": { "detail": "https://woordfees.co.za/en/program/poesie/", "tickets": null },
            "venue": { "name": "Erfurthuis", "slug": "erfurthuis" }
        });
        let chain = AdapterChain::default();
        assert_eq!(chain.select(&object(record.clone())).unwrap().name(), "nested");

        let item = chain.adapt(&record).unwrap();
        assert_eq!(item.venue_id, "erfurthuis");
        assert_eq!(item.ticket_url, None);
        assert_eq!(item.times, vec![ShowTime::new("", "11:00")]);
    }

    #[test]
    fn test_minimal_fallback_and_non_objects() {
        let chain = AdapterChain::default();
        let item = chain.adapt(&json!({ "title": "Straatteater" })).unwrap();
        assert_eq!(item.id, "straatteater");
        assert_eq!(item.venue_id, "");

        let untitled = chain.adapt(&json!({})).unwrap();
        assert_eq!(untitled.title, "Untitled");
        assert_eq!(untitled.id, "untitled");

        assert_eq!(chain.adapt(&json!("not an object")), None);
    }
}
