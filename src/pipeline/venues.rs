use std::collections::HashSet;
use tracing::{info, instrument, warn};

use super::{PipelineStats, ScrapeOutput};
use crate::config::Config;
use crate::constants::VENUE_PIPELINE;
use crate::enricher::{Enricher, EnrichmentTally};
use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::paginator::Paginator;
use crate::parser::{parse_venue_detail, parse_venue_listing};
use crate::types::Venue;

/// Crawl the venue archive, enrich each venue from its page, dedupe by name.
#[instrument(skip_all, fields(pipeline = VENUE_PIPELINE))]
pub async fn scrape_venues(fetcher: &dyn PageFetcher, config: &Config) -> Result<ScrapeOutput<Venue>> {
    info!(start = %config.site.venue_archive, "Crawling venue archive");
    let crawl = Paginator::new(fetcher, config.site.venue_archive.as_str(), parse_venue_listing)
        .run()
        .await?;

    let enricher = Enricher::new(fetcher, config.enrich.venue_concurrency, VENUE_PIPELINE);
    let outcomes = enricher
        .enrich_all(&crawl.stubs, |stub| stub.detail_url.as_deref(), parse_venue_detail)
        .await;
    let tally = EnrichmentTally::of(&outcomes);
    if tally.failed > 0 {
        warn!(failed = tally.failed, "Some venue pages could not be enriched; keeping listing data");
    }

    let stub_count = crawl.stubs.len();
    let venues = crawl
        .stubs
        .into_iter()
        .zip(outcomes)
        .map(|(stub, outcome)| {
            let mut venue = Venue::from_stub(stub);
            // A failed enrichment keeps the listing-level venue as is
            if let Some(Ok(details)) = outcome {
                venue.apply(details);
            }
            venue
        })
        .collect();
    let venues = dedup_by_name(venues);

    let stats = PipelineStats::new(crawl.pages, stub_count, tally, venues.len());
    stats.log(VENUE_PIPELINE);
    Ok(ScrapeOutput { items: venues, stats })
}

/// Keep the first venue seen for each name, in crawl order
pub fn dedup_by_name(venues: Vec<Venue>) -> Vec<Venue> {
    let mut seen = HashSet::new();
    venues
        .into_iter()
        .filter(|venue| seen.insert(venue.name.clone()))
        .collect()
}
