use scraper::Html;
use tracing::debug;
use url::Url;

use super::{next_page_url, non_empty, resolve, selector, text_of, time::parse_time_range, ListingPage};
use crate::error::Result;
use crate::types::{ProgrammeStub, VenueStub};

/// Parse one page of the venue archive.
///
/// Each `.post-list article` with a non-empty `h3` becomes a stub; the detail
/// link is the first anchor reading "Read more" or carrying `more-link`.
pub fn parse_venue_listing(html: &str, base: &Url) -> Result<ListingPage<VenueStub>> {
    let document = Html::parse_document(html);
    let article_sel = selector(".post-list article")?;
    let name_sel = selector("h3")?;
    let anchor_sel = selector("a")?;

    let mut stubs = Vec::new();
    for article in document.select(&article_sel) {
        let name = text_of(article, &name_sel);
        if name.is_empty() {
            continue;
        }
        let detail_url = article
            .select(&anchor_sel)
            .find(|a| {
                a.text().collect::<String>().contains("Read more")
                    || a.value().classes().any(|c| c == "more-link")
            })
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve(base, href));
        stubs.push(VenueStub::new(name, detail_url));
    }

    let next_url = next_page_url(&document, base)?;
    debug!(stubs = stubs.len(), next = ?next_url, "Parsed venue listing page");
    Ok(ListingPage { stubs, next_url })
}

/// Parse one page of the chronological programme.
///
/// Rows need a title, a programme link and a start time; anything else is
/// skipped silently.
pub fn parse_programme_listing(html: &str, base: &Url) -> Result<ListingPage<ProgrammeStub>> {
    let document = Html::parse_document(html);
    let row_sel = selector(".chronological-programme__row, .programme-row, li")?;
    let time_sel = selector(".time, .programme-time")?;
    let link_sel = selector("a[href*='/program/'], a[href*='/programme/']")?;
    let title_sel = selector(".title")?;
    let section_sel = selector(".category, .programme-category")?;
    let venue_sel = selector(".venue, .programme-venue")?;

    let mut stubs = Vec::new();
    for row in document.select(&row_sel) {
        let time_text = non_empty(text_of(row, &time_sel))
            .unwrap_or_else(|| row.text().collect::<String>());
        let Some(start) = parse_time_range(&time_text).start else {
            continue;
        };

        let link = row.select(&link_sel).next();
        let title = link
            .map(|a| a.text().collect::<String>().trim().to_string())
            .and_then(non_empty)
            .or_else(|| non_empty(text_of(row, &title_sel)));
        let href = link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve(base, href));

        let (Some(title), Some(href)) = (title, href) else {
            continue;
        };

        stubs.push(ProgrammeStub {
            href,
            title,
            section: non_empty(text_of(row, &section_sel)),
            venue_name: non_empty(text_of(row, &venue_sel)),
            start,
        });
    }

    let next_url = next_page_url(&document, base)?;
    debug!(stubs = stubs.len(), next = ?next_url, "Parsed programme listing page");
    Ok(ListingPage { stubs, next_url })
}
