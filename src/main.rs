use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use woordfees_scraper::catalog::Catalog;
use woordfees_scraper::config::Config;
use woordfees_scraper::constants;
use woordfees_scraper::fetcher::HttpFetcher;
use woordfees_scraper::logging;
use woordfees_scraper::pipeline::{scrape_programme, scrape_venues};
use woordfees_scraper::writer::write_assets;

#[derive(Parser)]
#[command(name = "woordfees_scraper")]
#[command(about = "Regenerates the festival app's venue and programme assets from woordfees.co.za")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (default: $WOORDFEES_CONFIG or woordfees.toml, skipped when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the JSON assets are written to (default: $WOORDFEES_ASSETS_DIR or assets)
    #[arg(long)]
    assets_dir: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var(constants::CONFIG_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_CONFIG_FILE));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    if let Some(dir) = cli
        .assets_dir
        .clone()
        .or_else(|| std::env::var(constants::ASSETS_DIR_ENV).ok().map(PathBuf::from))
    {
        config.output.assets_dir = dir;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let fetcher = HttpFetcher::new(&config.fetch.user_agent, config.retry_policy())?;

    let venues = scrape_venues(&fetcher, &config)
        .await
        .context("venue pipeline failed")?;
    let programme = scrape_programme(&fetcher, &config)
        .await
        .context("programme pipeline failed")?;

    let written = write_assets(
        &config.venues_path(),
        &config.programme_path(),
        &venues.items,
        &programme.items,
    )
    .context("writing assets failed")?;

    // Read the files back the way the app will and report join gaps
    let catalog = Catalog::load(&written.venues, &written.programme);
    let unmatched = catalog.unmatched_venue_ids();
    if !unmatched.is_empty() {
        warn!(count = unmatched.len(), venue_ids = ?unmatched, "Programme items reference unknown venues");
    }
    info!(
        venues = catalog.venues.len(),
        events = catalog.events.len(),
        "Assets verified"
    );

    println!(
        "Done: {} & {}",
        written.venues.display(),
        written.programme.display()
    );
    Ok(())
}
