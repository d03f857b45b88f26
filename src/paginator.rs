use metrics::counter;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, ScraperError};
use crate::fetcher::PageFetcher;
use crate::parser::ListingParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    HasNext(String),
    Done,
}

/// Everything a finished crawl collected
#[derive(Debug, Clone, PartialEq)]
pub struct Crawl<S> {
    pub stubs: Vec<S>,
    pub pages: usize,
}

/// Follows a listing's "next" links, accumulating stubs page by page.
///
/// A "next" link pointing at a page already fetched ends the crawl, so a
/// self-referential pagination control cannot loop forever.
pub struct Paginator<'a, S> {
    fetcher: &'a dyn PageFetcher,
    parse: ListingParser<S>,
    state: PageState,
    visited: HashSet<String>,
    stubs: Vec<S>,
    pages: usize,
}

impl<'a, S> Paginator<'a, S> {
    pub fn new(fetcher: &'a dyn PageFetcher, start_url: impl Into<String>, parse: ListingParser<S>) -> Self {
        Self {
            fetcher,
            parse,
            state: PageState::HasNext(start_url.into()),
            visited: HashSet::new(),
            stubs: Vec::new(),
            pages: 0,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Fetch and parse the current page, then advance to its "next" link.
    ///
    /// A fetch failure here is fatal for the crawl: retries already happened
    /// inside the fetcher.
    pub async fn step(&mut self) -> Result<&PageState> {
        let url = match &self.state {
            PageState::HasNext(url) => url.clone(),
            PageState::Done => return Ok(&self.state),
        };

        let base = Url::parse(&url).map_err(|source| ScraperError::Url {
            url: url.clone(),
            source,
        })?;
        let html = self.fetcher.get(&url).await?;
        let page = (self.parse)(&html, &base)?;

        self.pages += 1;
        counter!("woordfees_pages_fetched_total").increment(1);
        debug!(url = %url, page = self.pages, stubs = page.stubs.len(), "Fetched listing page");

        self.visited.insert(url);
        self.stubs.extend(page.stubs);
        self.state = match page.next_url {
            Some(next) if self.visited.contains(&next) => {
                warn!(next = %next, "Pagination points back to a visited page; stopping");
                PageState::Done
            }
            Some(next) => PageState::HasNext(next),
            None => PageState::Done,
        };
        Ok(&self.state)
    }

    pub async fn run(mut self) -> Result<Crawl<S>> {
        while matches!(self.state, PageState::HasNext(_)) {
            self.step().await?;
        }
        info!(pages = self.pages, stubs = self.stubs.len(), "Pagination finished");
        Ok(Crawl {
            stubs: self.stubs,
            pages: self.pages,
        })
    }
}
