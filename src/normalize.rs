// 🧹 Normalizer
// Canonical form of a row for comparison only (never persisted or displayed)

use crate::snapshot::Row;

/// Row after normalization: lowercase alphanumeric words, empty cells dropped
pub type NormalizedRow = Vec<String>;

/// Keep alphanumerics and whitespace, lowercase, collapse whitespace runs
///
/// Punctuation is removed outright, so `"$3,750"` and `"3750"` compare equal.
pub fn normalize_cell(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_row(row: &[String]) -> NormalizedRow {
    row.iter()
        .map(|cell| normalize_cell(cell))
        .filter(|cell| !cell.is_empty())
        .collect()
}

// ============================================================================
// EXCLUSION PRE-FILTER
// ============================================================================

/// Rows that never take part in a comparison
///
/// - empty rows (no cells at all)
/// - metadata rows: any cell mentions "timestamp"
/// - header-shaped rows: first cell mentions "type", second mentions "price"
pub fn is_excluded(row: &[String]) -> bool {
    if row.is_empty() {
        return true;
    }

    if row
        .iter()
        .any(|cell| cell.to_lowercase().contains("timestamp"))
    {
        return true;
    }

    match (row.first(), row.get(1)) {
        (Some(first), Some(second)) => {
            first.to_lowercase().contains("type") && second.to_lowercase().contains("price")
        }
        _ => false,
    }
}

/// Filter, normalize and sort a list of rows
///
/// A row whose cells all normalize away stays in as an empty row.
/// The result is sorted lexicographically, so two calls agree
/// regardless of input order.
pub fn normalize_snapshot(rows: &[Row]) -> Vec<NormalizedRow> {
    let mut normalized: Vec<NormalizedRow> = rows
        .iter()
        .filter(|row| !is_excluded(row))
        .map(|row| normalize_row(row))
        .collect();

    normalized.sort();
    normalized
}

// ============================================================================
// TESTS
// ============================================================================
