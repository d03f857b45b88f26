use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::constants;
use crate::error::{Result, ScraperError};
use crate::fetcher::RetryPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub enrich: EnrichConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub venue_archive: String,
    pub programme_index: String,
    pub festival_year: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub tries: u32,
    pub backoff_ms: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub venue_concurrency: usize,
    pub programme_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub assets_dir: PathBuf,
    pub venues_file: String,
    pub programme_file: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            venue_archive: constants::VENUE_ARCHIVE.to_string(),
            programme_index: constants::PROGRAMME_INDEX.to_string(),
            festival_year: constants::FESTIVAL_YEAR,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            tries: constants::FETCH_TRIES,
            backoff_ms: constants::FETCH_BACKOFF_MS,
            user_agent: constants::USER_AGENT.to_string(),
        }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            venue_concurrency: constants::VENUE_CONCURRENCY,
            programme_concurrency: constants::PROGRAMME_CONCURRENCY,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from(constants::ASSETS_DIR),
            venues_file: constants::VENUES_FILE.to_string(),
            programme_file: constants::PROGRAMME_FILE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the built-in defaults; a file that exists but
    /// does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.tries == 0 {
            return Err(ScraperError::Config("fetch.tries must be at least 1".into()));
        }
        if self.fetch.backoff_ms > constants::MAX_BACKOFF_MS {
            return Err(ScraperError::Config(format!(
                "fetch.backoff_ms must be at most {}",
                constants::MAX_BACKOFF_MS
            )));
        }
        for (key, cap) in [
            ("venue_concurrency", self.enrich.venue_concurrency),
            ("programme_concurrency", self.enrich.programme_concurrency),
        ] {
            if cap == 0 || cap > constants::MAX_CONCURRENCY {
                return Err(ScraperError::Config(format!(
                    "enrich.{key} must be between 1 and {}",
                    constants::MAX_CONCURRENCY
                )));
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            tries: self.fetch.tries,
            base_delay: Duration::from_millis(self.fetch.backoff_ms),
        }
    }

    pub fn venues_path(&self) -> PathBuf {
        self.output.assets_dir.join(&self.output.venues_file)
    }

    pub fn programme_path(&self) -> PathBuf {
        self.output.assets_dir.join(&self.output.programme_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_constants() {
        let config = Config::default();
        assert_eq!(config.fetch.tries, 3);
        assert_eq!(config.fetch.backoff_ms, 500);
        assert_eq!(config.enrich.venue_concurrency, 6);
        assert_eq!(config.enrich.programme_concurrency, 8);
        assert_eq!(config.venues_path(), PathBuf::from("assets/venues.json"));
        assert_eq!(config.programme_path(), PathBuf::from("assets/programme.json"));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [fetch]
            tries = 5

            [output]
            assets_dir = "app/assets"
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch.tries, 5);
        assert_eq!(config.fetch.user_agent, constants::USER_AGENT);
        assert_eq!(config.site.programme_index, constants::PROGRAMME_INDEX);
        assert_eq!(config.venues_path(), PathBuf::from("app/assets/venues.json"));
    }

    #[test]
    fn test_zero_tries_is_rejected() {
        let result = Config::from_toml("[fetch]\ntries = 0\n");
        assert!(matches!(result, Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_out_of_range_caps_and_backoff_are_rejected() {
        let huge_cap = Config::from_toml("[enrich]\nvenue_concurrency = 9223372036854775807\n");
        assert!(matches!(huge_cap, Err(ScraperError::Config(_))));

        let zero_cap = Config::from_toml("[enrich]\nprogramme_concurrency = 0\n");
        assert!(matches!(zero_cap, Err(ScraperError::Config(_))));

        let huge_backoff = Config::from_toml("[fetch]\nbackoff_ms = 9223372036854775807\n");
        assert!(matches!(huge_backoff, Err(ScraperError::Config(_))));

        let at_limit = Config::from_toml(&format!(
            "[fetch]\nbackoff_ms = {}\n[enrich]\nvenue_concurrency = {}\n",
            constants::MAX_BACKOFF_MS,
            constants::MAX_CONCURRENCY
        ));
        assert!(at_limit.is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config.site.festival_year, constants::FESTIVAL_YEAR);
    }

    #[test]
    fn test_retry_policy_uses_backoff() {
        let config = Config::default();
        let policy = config.retry_policy();
        assert_eq!(policy.tries, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
    }
}
