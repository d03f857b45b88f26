/// Festival site endpoints and crawl defaults shared across the codebase

pub const PROGRAMME_INDEX: &str = "https://woordfees.co.za/en/chronological-programme/";
pub const VENUE_ARCHIVE: &str = "https://woordfees.co.za/en/program-venue/";

/// Year assumed for "16 Oktober" style dates on detail pages
pub const FESTIVAL_YEAR: i32 = 2025;

pub const USER_AGENT: &str = "WoordfeesApp/1.0 (+script)";
pub const FETCH_TRIES: u32 = 3;
pub const FETCH_BACKOFF_MS: u64 = 500;
pub const MAX_BACKOFF_MS: u64 = 60_000;

pub const VENUE_CONCURRENCY: usize = 6;
pub const PROGRAMME_CONCURRENCY: usize = 8;
pub const MAX_CONCURRENCY: usize = 256;

pub const ASSETS_DIR: &str = "assets";
pub const VENUES_FILE: &str = "venues.json";
pub const PROGRAMME_FILE: &str = "programme.json";

pub const DEFAULT_CONFIG_FILE: &str = "woordfees.toml";
pub const CONFIG_ENV: &str = "WOORDFEES_CONFIG";
pub const ASSETS_DIR_ENV: &str = "WOORDFEES_ASSETS_DIR";

// Pipeline labels used in logs and metrics
pub const VENUE_PIPELINE: &str = "venues";
pub const PROGRAMME_PIPELINE: &str = "programme";
