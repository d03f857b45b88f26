use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}:\d{2})\s*(?:-\s*(\d{1,2}:\d{2}))?").expect("valid time range regex")
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid ISO date regex"));
static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2})").expect("valid time regex"));
// The day must not follow a digit or ':', so the minutes of "19:30 Mar" are not a day
static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^\d:])(\d{1,2})\s+([a-z]+)\b").expect("valid day month regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Find the first `HH:MM` or `HH:MM - HH:MM` in free text
pub fn parse_time_range(text: &str) -> TimeRange {
    match TIME_RANGE_RE.captures(text) {
        Some(caps) => TimeRange {
            start: caps.get(1).map(|m| m.as_str().to_string()),
            end: caps.get(2).map(|m| m.as_str().to_string()),
        },
        None => TimeRange::default(),
    }
}

pub fn find_iso_date(text: &str) -> Option<String> {
    ISO_DATE_RE.captures(text).map(|caps| caps[1].to_string())
}

pub fn find_time_of_day(text: &str) -> Option<String> {
    TIME_OF_DAY_RE.captures(text).map(|caps| caps[1].to_string())
}

/// Convert "16 Oktober" / "17 October" style text to `YYYY-MM-DD`.
///
/// Month names are matched in Afrikaans and English. Returns `None` for
/// impossible dates such as "31 November".
pub fn find_day_month(text: &str, year: i32) -> Option<String> {
    DAY_MONTH_RE.captures_iter(text).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
    })
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januarie" | "january" | "jan" => 1,
        "februarie" | "february" | "feb" => 2,
        "maart" | "march" | "mar" => 3,
        "april" | "apr" => 4,
        "mei" | "may" => 5,
        "junie" | "june" | "jun" => 6,
        "julie" | "july" | "jul" => 7,
        "augustus" | "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "oktober" | "october" | "okt" | "oct" => 10,
        "november" | "nov" => 11,
        "desember" | "december" | "des" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
