pub mod catalog;
pub mod config;
pub mod constants;
pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod paginator;
pub mod parser;
pub mod pipeline;
pub mod slug;
pub mod types;
pub mod writer;

pub use config::Config;
pub use error::{EnrichmentError, FetchError, Result, ScraperError};
pub use fetcher::{HttpFetcher, PageFetcher, RetryPolicy};
pub use types::{EventItem, ShowTime, Venue};
