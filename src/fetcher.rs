use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, Result, ScraperError};

/// Seam for all network access; pipelines only ever talk to this trait.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body, retrying per the implementation's policy
    async fn get(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// Linear backoff: the n-th retry waits `base_delay * n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub tries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            tries: crate::constants::FETCH_TRIES,
            base_delay: Duration::from_millis(crate::constants::FETCH_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Saturates at `Duration::MAX` instead of overflowing
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.checked_mul(attempt).unwrap_or(Duration::MAX)
    }
}

/// Run `attempt` until it succeeds or the policy gives up.
///
/// `attempt` receives the 1-based attempt number and reports failure as a
/// human-readable reason; the last reason ends up in the [`FetchError`].
pub async fn retry_get<F, Fut>(
    policy: RetryPolicy,
    url: &str,
    mut attempt: F,
) -> std::result::Result<String, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<String, String>>,
{
    let tries = policy.tries.max(1);
    let mut last_reason = String::new();

    for n in 1..=tries {
        counter!("woordfees_fetch_attempts_total").increment(1);
        match attempt(n).await {
            Ok(body) => return Ok(body),
            Err(reason) => {
                debug!(url, attempt = n, %reason, "GET attempt failed");
                last_reason = reason;
            }
        }
        if n < tries {
            tokio::time::sleep(policy.delay_after(n)).await;
        }
    }

    counter!("woordfees_fetch_failures_total").increment(1);
    warn!(url, tries, reason = %last_reason, "GET failed after all attempts");
    Err(FetchError {
        url: url.to_string(),
        attempts: tries,
        reason: last_reason,
    })
}

/// `reqwest`-backed fetcher sending a fixed identifying user agent
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ScraperError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, policy })
    }

    async fn attempt(&self, url: &str) -> std::result::Result<String, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }
        response.text().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> std::result::Result<String, FetchError> {
        retry_get(self.policy, url, |_| self.attempt(url)).await
    }
}
