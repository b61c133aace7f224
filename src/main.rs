// Availability Watch - Repeating checker
// Checks the listing page forever, pausing 2-5 minutes between checks

use anyhow::{Context, Result};
use availability_watch::{init_logging, notifier_from_config, HttpFetcher, WatchConfig, Watcher};
use log::info;

fn main() -> Result<()> {
    init_logging();

    let config = WatchConfig::load()?;
    info!(
        "🏠 availability-watch {} watching {}",
        availability_watch::VERSION,
        config.url
    );

    let fetcher = HttpFetcher::new(&config).context("Failed to build HTTP client")?;
    let notifier = notifier_from_config(&config).context("Failed to build notifier")?;

    let watcher = Watcher::new(config, fetcher, notifier);
    watcher
        .run_forever()
        .context("Failed to load the stored snapshot")?;

    Ok(())
}
