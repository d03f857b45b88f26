// Crawl pipelines: paginate a listing, enrich from detail pages, then normalize

pub mod programme;
pub mod venues;

pub use programme::{merge_by_key, scrape_programme, sort_by_title};
pub use venues::{dedup_by_name, scrape_venues};

use serde::Serialize;
use tracing::info;

use crate::enricher::EnrichmentTally;

/// Counts reported at the end of a pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub pages: usize,
    pub stubs: usize,
    pub enriched: usize,
    pub failed: usize,
    pub without_detail: usize,
    /// Records left after dedup/merge
    pub items: usize,
}

impl PipelineStats {
    pub(crate) fn new(pages: usize, stubs: usize, tally: EnrichmentTally, items: usize) -> Self {
        Self {
            pages,
            stubs,
            enriched: tally.enriched,
            failed: tally.failed,
            without_detail: tally.without_detail,
            items,
        }
    }

    pub(crate) fn log(&self, pipeline: &str) {
        info!(
            pipeline,
            pages = self.pages,
            stubs = self.stubs,
            enriched = self.enriched,
            failed = self.failed,
            without_detail = self.without_detail,
            items = self.items,
            "Pipeline finished"
        );
    }
}

/// Final records of a pipeline and how they were obtained
#[derive(Debug, Clone)]
pub struct ScrapeOutput<T> {
    pub items: Vec<T>,
    pub stats: PipelineStats,
}
