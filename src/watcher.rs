// 🔁 Watcher - Orchestrates one check cycle and the repeating loop
// fetch → extract → compare → persist → notify
//
// State is explicit: every cycle receives the previous snapshot and hands
// back the one the next cycle should compare against.

use crate::config::WatchConfig;
use crate::detect::{fingerprint, ChangeDetector, ChangeSummary};
use crate::error::WatchError;
use crate::extract::extract_table;
use crate::fetch::Fetcher;
use crate::notify::Notifier;
use crate::snapshot::Snapshot;
use crate::store::{format_timestamp, SnapshotStore};
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use rand::Rng;
use std::time::Duration;

// ============================================================================
// CYCLE RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No prior data: snapshot stored, nobody notified
    Initialized,

    /// Normalized rows differ from the previous snapshot
    Updated(ChangeSummary),

    /// Same rows; latest snapshot refreshed on disk anyway
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub snapshot: Snapshot,
    pub checked_at: NaiveDateTime,
}

/// WatchState - What the repeating loop carries from one cycle to the next
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    pub previous: Option<Snapshot>,
    pub cycles: u64,
    pub failures: u64,
}

// ============================================================================
// WATCHER
// ============================================================================

pub struct Watcher<F, N> {
    config: WatchConfig,
    store: SnapshotStore,
    fetcher: F,
    notifier: N,
    detector: ChangeDetector,
}

impl<F: Fetcher, N: Notifier> Watcher<F, N> {
    pub fn new(config: WatchConfig, fetcher: F, notifier: N) -> Self {
        let store = SnapshotStore::new(&config);
        Watcher {
            config,
            store,
            fetcher,
            notifier,
            detector: ChangeDetector,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// One fetch → compare → persist → notify pass
    ///
    /// A fetch failure returns before anything is written.
    pub fn run_cycle(&self, previous: Option<&Snapshot>) -> Result<CycleReport, WatchError> {
        let checked_at = Local::now().naive_local();
        info!("Checking for updates... ({})", format_timestamp(checked_at));

        let markup = self.fetcher.fetch(&self.config.url)?;
        let current = extract_table(&markup);

        let outcome = match previous {
            None => {
                info!("First check - displaying table data:");
                println!("{}", current.render());
                self.store.save(&current, checked_at)?;
                CycleOutcome::Initialized
            }
            Some(previous) if self.detector.has_updated(previous, &current) => {
                let summary = self.detector.summarize(previous, &current);
                info!(
                    "Data has been updated! ({}, fingerprint {})",
                    summary.describe(),
                    fingerprint(&current)
                );
                println!("{}", current.render());

                self.store.save(&current, checked_at)?;
                self.store.append_change(&current, checked_at)?;
                self.send_notification(&summary);

                CycleOutcome::Updated(summary)
            }
            Some(_) => {
                info!("No updates found.");
                self.store.save(&current, checked_at)?;
                CycleOutcome::Unchanged
            }
        };

        Ok(CycleReport {
            outcome,
            snapshot: current,
            checked_at,
        })
    }

    /// Single cycle against whatever the store holds (for cron-style use)
    pub fn run_once(&self) -> Result<CycleReport, WatchError> {
        let previous = self.store.load()?;
        self.run_cycle(previous.as_ref())
    }

    /// Loop start: previous snapshot comes from disk
    pub fn initial_state(&self) -> Result<WatchState, WatchError> {
        Ok(WatchState {
            previous: self.store.load()?,
            ..WatchState::default()
        })
    }

    /// Run one cycle and return the state for the next one
    ///
    /// Errors are logged and the previous snapshot is kept, so a failed
    /// fetch never counts as "the table disappeared".
    pub fn step(&self, state: WatchState) -> WatchState {
        match self.run_cycle(state.previous.as_ref()) {
            Ok(report) => WatchState {
                previous: Some(report.snapshot),
                cycles: state.cycles + 1,
                failures: state.failures,
            },
            Err(e) => {
                error!("An error occurred: {}", e);
                WatchState {
                    cycles: state.cycles + 1,
                    failures: state.failures + 1,
                    ..state
                }
            }
        }
    }

    /// Check forever with a random pause between cycles
    pub fn run_forever(&self) -> Result<(), WatchError> {
        let mut state = self.initial_state()?;
        loop {
            state = self.step(state);

            let wait = self.next_wait();
            info!("Waiting {} seconds before the next check...", wait.as_secs());
            std::thread::sleep(wait);
        }
    }

    /// Uniform in [min_wait_secs, max_wait_secs]
    pub fn next_wait(&self) -> Duration {
        let min = self.config.min_wait_secs;
        let max = self.config.max_wait_secs.max(min);
        Duration::from_secs(rand::thread_rng().gen_range(min..=max))
    }

    fn send_notification(&self, summary: &ChangeSummary) {
        let message = format!(
            "{} ({})",
            self.config.notification_message,
            summary.describe()
        );
        if let Err(e) = self.notifier.notify(&message) {
            warn!("Failed to send notification: {}", e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    /// Serves scripted pages in order; `None` simulates an HTTP 503
    struct ScriptedFetcher {
        pages: RefCell<VecDeque<Option<String>>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Option<&str>>) -> Self {
            ScriptedFetcher {
                pages: RefCell::new(pages.into_iter().map(|p| p.map(str::to_string)).collect()),
            }
        }
    }

    impl Fetcher for ScriptedFetcher {
        fn fetch(&self, url: &str) -> Result<String, WatchError> {
            match self.pages.borrow_mut().pop_front().flatten() {
                Some(page) => Ok(page),
                None => Err(WatchError::Status {
                    status: 503,
                    url: url.to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) -> Result<(), WatchError> {
            self.messages.borrow_mut().push(message.to_string());
            if self.fail {
                return Err(WatchError::Notification("webhook down".to_string()));
            }
            Ok(())
        }
    }

    const PAGE_A: &str = "<table>\
        <tr><th>Type</th><th>Price</th><th>Available</th></tr>\
        <tr><td>Studio</td><td>$3,750</td><td>Now</td></tr>\
        <tr><td>1BR</td><td>$4,200</td><td>March 1</td></tr>\
        </table>";

    // PAGE_A reordered with formatting drift
    const PAGE_A_REORDERED: &str = "<table>\
        <tr><th>Type</th><th>Price</th><th>Available</th></tr>\
        <tr><td> 1br </td><td>$4,200</td><td>march 1</td></tr>\
        <tr><td>STUDIO</td><td>$3,750</td><td>Now</td></tr>\
        </table>";

    const PAGE_B: &str = "<table>\
        <tr><th>Type</th><th>Price</th><th>Available</th></tr>\
        <tr><td>Studio</td><td>$3,759</td><td>Now</td></tr>\
        <tr><td>1BR</td><td>$4,200</td><td>March 1</td></tr>\
        </table>";

    fn config_in(dir: &TempDir) -> WatchConfig {
        WatchConfig {
            url: "https://example.com/availabilities/".to_string(),
            data_dir: dir.path().join("data"),
            min_wait_secs: 2,
            max_wait_secs: 5,
            ..WatchConfig::default()
        }
    }

    #[test]
    fn test_first_cycle_initializes_without_notifying() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A)]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let report = watcher.run_cycle(None).unwrap();

        assert_eq!(report.outcome, CycleOutcome::Initialized);
        assert_eq!(report.snapshot.data_rows().len(), 2);
        assert!(notifier.messages.borrow().is_empty());
        assert!(watcher.store().snapshot_path().exists());
        assert!(!watcher.store().change_log_path().exists());
    }

    #[test]
    fn test_unchanged_cycle_refreshes_snapshot_only() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A), Some(PAGE_A_REORDERED)]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let first = watcher.run_cycle(None).unwrap();
        let second = watcher.run_cycle(Some(&first.snapshot)).unwrap();

        assert_eq!(second.outcome, CycleOutcome::Unchanged);
        assert!(notifier.messages.borrow().is_empty());
        assert!(!watcher.store().change_log_path().exists());
        assert_eq!(watcher.store().load().unwrap(), Some(second.snapshot));
    }

    #[test]
    fn test_updated_cycle_logs_and_notifies() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A), Some(PAGE_B)]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let first = watcher.run_cycle(None).unwrap();
        let second = watcher.run_cycle(Some(&first.snapshot)).unwrap();

        match &second.outcome {
            CycleOutcome::Updated(summary) => assert_eq!(summary.describe(), "1 added, 1 removed"),
            other => panic!("expected update, got {:?}", other),
        }
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            ["Apartment availability updated! (1 added, 1 removed)"]
        );

        let log = fs::read_to_string(watcher.store().change_log_path()).unwrap();
        assert_eq!(log.matches("=== Changes detected at").count(), 1);
        assert!(log.contains("Studio | $3,759 | Now"));
    }

    #[test]
    fn test_fetch_failure_leaves_snapshot_file_untouched() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A), None]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let first = watcher.run_cycle(None).unwrap();
        let before = fs::read_to_string(watcher.store().snapshot_path()).unwrap();

        let err = watcher.run_cycle(Some(&first.snapshot)).unwrap_err();

        assert!(err.is_transport());
        let after = fs::read_to_string(watcher.store().snapshot_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_step_keeps_previous_state_on_failure() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A), None, Some(PAGE_B)]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let state = watcher.initial_state().unwrap();
        assert!(state.previous.is_none());

        let state = watcher.step(state);
        let kept = state.previous.clone();
        let state = watcher.step(state);

        assert_eq!(state.previous, kept);
        assert_eq!((state.cycles, state.failures), (2, 1));

        let state = watcher.step(state);
        assert_eq!((state.cycles, state.failures), (3, 1));
        assert_eq!(notifier.messages.borrow().len(), 1);
    }

    #[test]
    fn test_notification_failure_does_not_fail_cycle() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A), Some(PAGE_B)]);
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let first = watcher.run_cycle(None).unwrap();
        let second = watcher.run_cycle(Some(&first.snapshot));

        assert!(matches!(
            second.map(|r| r.outcome),
            Ok(CycleOutcome::Updated(_))
        ));
        assert!(watcher.store().change_log_path().exists());
    }

    #[test]
    fn test_table_disappearing_is_an_update() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![
            Some(PAGE_A),
            Some("<html><body>Maintenance</body></html>"),
        ]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        let first = watcher.run_cycle(None).unwrap();
        let second = watcher.run_cycle(Some(&first.snapshot)).unwrap();

        assert!(second.snapshot.is_empty());
        assert!(matches!(second.outcome, CycleOutcome::Updated(_)));
    }

    #[test]
    fn test_run_once_compares_against_stored_snapshot() {
        let dir = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();

        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A)]);
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);
        assert_eq!(watcher.run_once().unwrap().outcome, CycleOutcome::Initialized);

        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_A_REORDERED)]);
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);
        assert_eq!(watcher.run_once().unwrap().outcome, CycleOutcome::Unchanged);

        let fetcher = ScriptedFetcher::new(vec![Some(PAGE_B)]);
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);
        assert!(matches!(
            watcher.run_once().unwrap().outcome,
            CycleOutcome::Updated(_)
        ));
    }

    #[test]
    fn test_next_wait_within_bounds() {
        let dir = TempDir::new().unwrap();
        let fetcher = ScriptedFetcher::new(vec![]);
        let notifier = RecordingNotifier::default();
        let watcher = Watcher::new(config_in(&dir), &fetcher, &notifier);

        for _ in 0..50 {
            let wait = watcher.next_wait().as_secs();
            assert!((2..=5).contains(&wait));
        }
    }
}
