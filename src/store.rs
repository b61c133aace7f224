// 💾 Snapshot Store
// Latest snapshot (text + JSON) and the append-only change log

use crate::config::WatchConfig;
use crate::detect::fingerprint;
use crate::error::WatchError;
use crate::snapshot::{Row, Snapshot, CELL_SEPARATOR};
use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Format used for every timestamp written by the store
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_PREFIX: &str = "Timestamp: ";

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

// ============================================================================
// STRUCTURED RECORD
// ============================================================================

/// What goes into the JSON file: the exact rows plus a little metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub saved_at: NaiveDateTime,
    pub fingerprint: String,
    pub snapshot: Snapshot,
}

// ============================================================================
// SNAPSHOT STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
    snapshot_path: PathBuf,
    structured_path: PathBuf,
    change_log_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(config: &WatchConfig) -> Self {
        SnapshotStore {
            data_dir: config.data_dir.clone(),
            snapshot_path: config.snapshot_path(),
            structured_path: config.structured_path(),
            change_log_path: config.change_log_path(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn structured_path(&self) -> &Path {
        &self.structured_path
    }

    pub fn change_log_path(&self) -> &Path {
        &self.change_log_path
    }

    /// Overwrite the latest snapshot (text export + JSON record)
    pub fn save(&self, snapshot: &Snapshot, saved_at: NaiveDateTime) -> Result<(), WatchError> {
        self.ensure_data_dir()?;

        let mut text = String::new();
        for row in snapshot.persistable_rows() {
            text.push_str(&row.join(CELL_SEPARATOR));
            text.push('\n');
        }
        text.push('\n');
        text.push_str(TIMESTAMP_PREFIX);
        text.push_str(&format_timestamp(saved_at));
        text.push('\n');

        fs::write(&self.snapshot_path, text)
            .map_err(|e| WatchError::persistence(&self.snapshot_path, e))?;

        let record = StoredSnapshot {
            saved_at,
            fingerprint: fingerprint(snapshot),
            snapshot: snapshot.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.structured_path, json)
            .map_err(|e| WatchError::persistence(&self.structured_path, e))?;

        debug!(
            "Saved {} rows to {}",
            snapshot.rows.len(),
            self.snapshot_path.display()
        );
        Ok(())
    }

    /// Previous snapshot, or None when nothing has been saved yet
    ///
    /// The JSON record is preferred; the text file is only a fallback
    /// and its reconstruction is lossy.
    pub fn load(&self) -> Result<Option<Snapshot>, WatchError> {
        match self.load_structured() {
            Ok(Some(record)) => return Ok(Some(record.snapshot)),
            Ok(None) => {}
            Err(e) => warn!(
                "Ignoring unreadable {}: {}",
                self.structured_path.display(),
                e
            ),
        }
        self.load_text()
    }

    pub fn load_structured(&self) -> Result<Option<StoredSnapshot>, WatchError> {
        let content = match read_if_exists(&self.structured_path)? {
            Some(content) => content,
            None => return Ok(None),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Rebuild a snapshot from the pipe-delimited text file
    pub fn load_text(&self) -> Result<Option<Snapshot>, WatchError> {
        Ok(read_if_exists(&self.snapshot_path)?.map(|content| parse_snapshot_text(&content)))
    }

    /// Append one "changes detected" block to the change log
    pub fn append_change(
        &self,
        snapshot: &Snapshot,
        detected_at: NaiveDateTime,
    ) -> Result<(), WatchError> {
        self.ensure_data_dir()?;

        let path = &self.change_log_path;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| WatchError::persistence(path, e))?;
        let mut out = BufWriter::new(file);

        let write = |out: &mut BufWriter<fs::File>| -> std::io::Result<()> {
            writeln!(
                out,
                "=== Changes detected at {} ===",
                format_timestamp(detected_at)
            )?;
            for row in snapshot.persistable_rows() {
                writeln!(out, "{}", row.join(CELL_SEPARATOR))?;
            }
            writeln!(out)?;
            out.flush()
        };
        write(&mut out).map_err(|e| WatchError::persistence(path, e))
    }

    fn ensure_data_dir(&self) -> Result<(), WatchError> {
        if self.data_dir.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.data_dir).map_err(|e| WatchError::persistence(&self.data_dir, e))
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>, WatchError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(WatchError::persistence(path, e)),
    }
}

/// Split lines on " | ", ignoring the trailing timestamp line
///
/// The first line is always the header. A table without `<th>` cells is
/// saved with a blank header line, which comes back as an empty header row
/// rather than promoting the first data row. Other blank lines are skipped.
pub fn parse_snapshot_text(content: &str) -> Snapshot {
    let mut lines: Vec<&str> = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();

    while lines.last().map_or(false, |line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines
        .last()
        .map_or(false, |line| line.starts_with(TIMESTAMP_PREFIX.trim_end()))
    {
        lines.pop();
    }

    if lines.iter().all(|line| line.trim().is_empty()) {
        return Snapshot::empty();
    }

    let split = |line: &str| -> Row {
        if line.trim().is_empty() {
            Vec::new()
        } else {
            line.split(CELL_SEPARATOR).map(str::to_string).collect()
        }
    };

    let mut lines = lines.into_iter();
    let mut rows: Vec<Row> = lines.next().map(split).into_iter().collect();
    rows.extend(
        lines
            .filter(|line| !line.trim().is_empty())
            .map(split),
    );

    Snapshot::from_rows(rows)
}

// ============================================================================
// TESTS
// ============================================================================
