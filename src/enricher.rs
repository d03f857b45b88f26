use futures::future::join_all;
use metrics::counter;
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

use crate::error::{EnrichmentError, Result};
use crate::fetcher::PageFetcher;

pub type EnrichmentResult<D> = std::result::Result<D, EnrichmentError>;

/// Per-stub result of an enrichment pass.
///
/// `None` means the stub had no detail page to visit.
pub type Outcome<D> = Option<EnrichmentResult<D>>;

/// Fetches detail pages for many stubs with at most `concurrency` requests in flight.
///
/// All fetches are driven from the calling task; the semaphore is the only
/// shared state. Results come back in input order whatever order the fetches
/// complete in.
pub struct Enricher<'a> {
    fetcher: &'a dyn PageFetcher,
    gate: Semaphore,
    label: &'static str,
}

impl<'a> Enricher<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, concurrency: usize, label: &'static str) -> Self {
        Self {
            fetcher,
            gate: Semaphore::new(concurrency.clamp(1, Semaphore::MAX_PERMITS)),
            label,
        }
    }

    pub async fn enrich_all<S, D, U, P>(&self, stubs: &[S], detail_url: U, parse: P) -> Vec<Outcome<D>>
    where
        U: Fn(&S) -> Option<&str>,
        P: Fn(&str, &Url) -> Result<D>,
    {
        let detail_url = &detail_url;
        let parse = &parse;
        let tasks = stubs.iter().map(|stub| async move {
            match detail_url(stub) {
                Some(url) => Some(self.enrich_one(url, parse).await),
                None => None,
            }
        });
        let outcomes = join_all(tasks).await;

        for outcome in &outcomes {
            let result = match outcome {
                None => "skipped",
                Some(Ok(_)) => "enriched",
                Some(Err(_)) => "failed",
            };
            counter!("woordfees_enrichment_total", "pipeline" => self.label, "outcome" => result)
                .increment(1);
        }
        outcomes
    }

    async fn enrich_one<D, P>(&self, url: &str, parse: &P) -> EnrichmentResult<D>
    where
        P: Fn(&str, &Url) -> Result<D>,
    {
        let base = Url::parse(url).map_err(|_| EnrichmentError::InvalidUrl {
            url: url.to_string(),
        })?;
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| EnrichmentError::GateClosed)?;

        let html = self.fetcher.get(url).await.map_err(|e| {
            debug!(url, error = %e, "Detail page fetch failed");
            e
        })?;
        parse(&html, &base).map_err(|source| {
            debug!(url, error = %source, "Detail page parse failed");
            EnrichmentError::Parse {
                url: url.to_string(),
                source,
            }
        })
    }
}

/// Tally of an enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentTally {
    pub enriched: usize,
    pub failed: usize,
    pub without_detail: usize,
}

impl EnrichmentTally {
    pub fn of<D>(outcomes: &[Outcome<D>]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, outcome| {
            match outcome {
                None => tally.without_detail += 1,
                Some(Ok(_)) => tally.enriched += 1,
                Some(Err(_)) => tally.failed += 1,
            }
            tally
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ScraperError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the URL back as the body after a short delay, tracking peak concurrency
    struct SlowEcho {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl SlowEcho {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl PageFetcher for SlowEcho {
        async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail_on == Some(url) {
                return Err(FetchError {
                    url: url.to_string(),
                    attempts: 3,
                    reason: "HTTP 500".into(),
                });
            }
            Ok(url.to_string())
        }
    }

    fn urls(n: usize) -> Vec<Option<String>> {
        (0..n).map(|i| Some(format!("https://site.test/item/{i}/"))).collect()
    }

    fn echo_parse(html: &str, _base: &Url) -> Result<String> {
        Ok(html.to_uppercase())
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_cap() {
        let fetcher = SlowEcho::new(None);
        let enricher = Enricher::new(&fetcher, 3, "test");
        let stubs = urls(10);

        let outcomes = enricher
            .enrich_all(&stubs, |s| s.as_deref(), echo_parse)
            .await;

        assert_eq!(outcomes.len(), 10);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        assert!(fetcher.peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_oversized_cap_is_clamped() {
        let fetcher = SlowEcho::new(None);
        let enricher = Enricher::new(&fetcher, usize::MAX, "test");
        let outcomes = enricher
            .enrich_all(&urls(3), |s| s.as_deref(), echo_parse)
            .await;
        assert!(outcomes.iter().all(|o| matches!(o, Some(Ok(_)))));
    }

    #[tokio::test]
    async fn test_outcomes_preserve_input_order() {
        let fetcher = SlowEcho::new(None);
        let enricher = Enricher::new(&fetcher, 4, "test");
        let stubs = urls(6);

        let outcomes = enricher
            .enrich_all(&stubs, |s| s.as_deref(), echo_parse)
            .await;

        for (i, outcome) in outcomes.into_iter().enumerate() {
            let body = outcome.unwrap().unwrap();
            assert_eq!(body, format!("HTTPS://SITE.TEST/ITEM/{i}/"));
        }
    }

    #[tokio::test]
    async fn test_failures_and_missing_urls_are_isolated() {
        let fetcher = SlowEcho::new(Some("https://site.test/item/1/"));
        let enricher = Enricher::new(&fetcher, 2, "test");
        let mut stubs = urls(4);
        stubs[3] = None;

        let outcomes = enricher
            .enrich_all(&stubs, |s| s.as_deref(), echo_parse)
            .await;

        assert!(matches!(outcomes[0], Some(Ok(_))));
        assert!(matches!(outcomes[1], Some(Err(EnrichmentError::Fetch(_)))));
        assert!(matches!(outcomes[2], Some(Ok(_))));
        assert!(outcomes[3].is_none());

        let tally = EnrichmentTally::of(&outcomes);
        assert_eq!(
            tally,
            EnrichmentTally {
                enriched: 2,
                failed: 1,
                without_detail: 1
            }
        );
    }

    #[tokio::test]
    async fn test_parse_error_becomes_enrichment_error() {
        let fetcher = SlowEcho::new(None);
        let enricher = Enricher::new(&fetcher, 1, "test");
        let stubs = urls(1);

        let outcomes = enricher
            .enrich_all(&stubs, |s| s.as_deref(), |_: &str, _: &Url| -> Result<()> {
                Err(ScraperError::Selector("broken".into()))
            })
            .await;

        assert!(matches!(outcomes[0], Some(Err(EnrichmentError::Parse { .. }))));
    }

    #[tokio::test]
    async fn test_relative_detail_url_is_rejected() {
        let fetcher = SlowEcho::new(None);
        let enricher = Enricher::new(&fetcher, 1, "test");
        let stubs = vec![Some("/en/program/x/".to_string())];

        let outcomes = enricher
            .enrich_all(&stubs, |s| s.as_deref(), echo_parse)
            .await;

        assert!(matches!(outcomes[0], Some(Err(EnrichmentError::InvalidUrl { .. }))));
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 0);
    }
}
