// Availability Watch - Core Library
// Fetch → extract → normalize → compare → persist → notify
// Exposes all modules for use in both binaries and tests

pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod notify;
pub mod snapshot;
pub mod store;
pub mod watcher;

// Re-export commonly used types
pub use config::WatchConfig;
pub use detect::{fingerprint, has_updated, ChangeDetector, ChangeSummary};
pub use error::WatchError;
pub use extract::{extract_table, TableExtractor};
pub use fetch::{Fetcher, HttpFetcher};
pub use normalize::{is_excluded, normalize_cell, normalize_row, normalize_snapshot, NormalizedRow};
pub use notify::{notifier_from_config, LogNotifier, Notifier, WebhookNotifier};
pub use snapshot::{Row, Snapshot};
pub use store::{SnapshotStore, StoredSnapshot};
pub use watcher::{CycleOutcome, CycleReport, WatchState, Watcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logger setup shared by both binaries (`RUST_LOG` overrides the default)
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
