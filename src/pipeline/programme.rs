use std::collections::HashMap;
use tracing::{info, instrument, warn};

use super::{PipelineStats, ScrapeOutput};
use crate::config::Config;
use crate::constants::PROGRAMME_PIPELINE;
use crate::enricher::{Enricher, EnrichmentTally};
use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::paginator::Paginator;
use crate::parser::{parse_programme_listing, ProgrammeDetailParser};
use crate::types::EventItem;

/// Crawl the chronological programme, enrich every row from its detail page,
/// merge showings of the same production at the same venue, sort by title.
#[instrument(skip_all, fields(pipeline = PROGRAMME_PIPELINE))]
pub async fn scrape_programme(
    fetcher: &dyn PageFetcher,
    config: &Config,
) -> Result<ScrapeOutput<EventItem>> {
    info!(start = %config.site.programme_index, "Crawling programme index");
    let crawl = Paginator::new(fetcher, config.site.programme_index.as_str(), parse_programme_listing)
        .run()
        .await?;

    let detail_parser = ProgrammeDetailParser::new(config.site.festival_year);
    let enricher = Enricher::new(fetcher, config.enrich.programme_concurrency, PROGRAMME_PIPELINE);
    let outcomes = enricher
        .enrich_all(
            &crawl.stubs,
            |stub| Some(stub.href.as_str()),
            |html, base| detail_parser.parse(html, base),
        )
        .await;
    let tally = EnrichmentTally::of(&outcomes);
    if tally.failed > 0 {
        warn!(failed = tally.failed, "Some programme pages could not be enriched; keeping listing data");
    }

    let stub_count = crawl.stubs.len();
    let items = crawl
        .stubs
        .into_iter()
        .zip(outcomes)
        .map(|(stub, outcome)| EventItem::from_stub(stub, outcome.and_then(|r| r.ok())))
        .collect();

    let mut items = merge_by_key(items);
    sort_by_title(&mut items);

    let stats = PipelineStats::new(crawl.pages, stub_count, tally, items.len());
    stats.log(PROGRAMME_PIPELINE);
    Ok(ScrapeOutput { items, stats })
}

/// Combine items sharing `id::venueId`.
///
/// The first item of a group keeps its scalar fields; `times` of later items
/// are appended in encounter order, identical showings included.
pub fn merge_by_key(items: Vec<EventItem>) -> Vec<EventItem> {
    let mut merged: Vec<EventItem> = Vec::with_capacity(items.len());
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = item.merge_key();
        match index_by_key.get(&key) {
            Some(&idx) => merged[idx].times.extend(item.times),
            None => {
                index_by_key.insert(key, merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

/// Ordinal, stable sort by title
pub fn sort_by_title(items: &mut [EventItem]) {
    items.sort_by(|a, b| a.title.cmp(&b.title));
}
