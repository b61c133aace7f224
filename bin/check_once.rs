// Availability Watch - One-shot checker
// Runs a single cycle and exits; meant for cron or CI schedulers

use anyhow::{Context, Result};
use availability_watch::{
    init_logging, notifier_from_config, CycleOutcome, HttpFetcher, WatchConfig, Watcher,
};
use log::info;

fn main() -> Result<()> {
    init_logging();

    let config = WatchConfig::load()?;
    let fetcher = HttpFetcher::new(&config).context("Failed to build HTTP client")?;
    let notifier = notifier_from_config(&config).context("Failed to build notifier")?;
    let watcher = Watcher::new(config, fetcher, notifier);

    // Any error here (fetch included) ends the process with a non-zero code
    let report = watcher
        .run_once()
        .with_context(|| format!("Check of {} failed", watcher.config().url))?;

    match report.outcome {
        CycleOutcome::Initialized => info!("✓ Initial snapshot stored"),
        CycleOutcome::Updated(summary) => info!("✓ Change recorded ({})", summary.describe()),
        CycleOutcome::Unchanged => info!("✓ No change"),
    }

    Ok(())
}
