use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "scraper.log";
const DEFAULT_FILTER: &str = "woordfees_scraper=info,warn";

fn file_writer() -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("cannot create {LOG_DIR}/: {e}; file logging may be lost");
    }
    tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE))
}

/// Console output for the operator plus one JSON line per event in
/// `logs/scraper.log.<date>`. `RUST_LOG` replaces the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (writer, guard) = file_writer();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
        .with(fmt::layer().json().with_writer(writer))
        .init();

    // flushes on drop, so it must live until exit
    std::mem::forget(guard);
}
