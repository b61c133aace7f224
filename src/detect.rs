// 🔍 Change Detector
// Order- and formatting-insensitive comparison of two snapshots

use crate::normalize::{normalize_snapshot, NormalizedRow};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// True when the normalized row sets differ
///
/// Both sides go through the same exclusion filter and normalization,
/// then are compared as sorted sequences. Two snapshots that reduce to
/// zero rows are equal.
pub fn has_updated(previous: &Snapshot, current: &Snapshot) -> bool {
    normalize_snapshot(&previous.rows) != normalize_snapshot(&current.rows)
}

/// SHA-256 of the normalized, sorted snapshot
///
/// Equal fingerprints mean `has_updated` would return false.
pub fn fingerprint(snapshot: &Snapshot) -> String {
    let mut hasher = Sha256::new();
    for row in normalize_snapshot(&snapshot.rows) {
        for cell in &row {
            hasher.update(cell.as_bytes());
            hasher.update([0x1f_u8]);
        }
        hasher.update([0x1e_u8]);
    }
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// CHANGE SUMMARY
// ============================================================================

/// Which normalized rows appeared or disappeared between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub added: Vec<NormalizedRow>,
    pub removed: Vec<NormalizedRow>,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Short human-readable tail for log lines and notifications
    pub fn describe(&self) -> String {
        format!("{} added, {} removed", self.added.len(), self.removed.len())
    }
}

/// ChangeDetector - Compares snapshots and explains the difference
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn has_updated(&self, previous: &Snapshot, current: &Snapshot) -> bool {
        has_updated(previous, current)
    }

    /// Multiset difference of the normalized rows
    ///
    /// A row present twice before and once now counts as one removal.
    pub fn summarize(&self, previous: &Snapshot, current: &Snapshot) -> ChangeSummary {
        let mut counts: BTreeMap<NormalizedRow, i64> = BTreeMap::new();
        for row in normalize_snapshot(&current.rows) {
            *counts.entry(row).or_insert(0) += 1;
        }
        for row in normalize_snapshot(&previous.rows) {
            *counts.entry(row).or_insert(0) -= 1;
        }

        let mut summary = ChangeSummary::default();
        for (row, count) in counts {
            if count > 0 {
                summary
                    .added
                    .extend(std::iter::repeat(row).take(count as usize));
            } else if count < 0 {
                summary
                    .removed
                    .extend(std::iter::repeat(row).take(count.unsigned_abs() as usize));
            }
        }
        summary
    }
}

// ============================================================================
// TESTS
// ============================================================================
