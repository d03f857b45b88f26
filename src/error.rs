use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Raised once a URL has failed every attempt the retry policy allows.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("GET failed: {url} after {attempts} attempt(s) ({reason})")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub reason: String,
}

/// Why a single stub could not be enriched from its detail page.
///
/// These never abort a pipeline; the stub keeps its listing-level fields.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to parse detail page {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ScraperError,
    },

    #[error("Detail URL is not absolute: {url}")]
    InvalidUrl { url: String },

    #[error("Concurrency gate closed")]
    GateClosed,
}

pub type Result<T> = std::result::Result<T, ScraperError>;
