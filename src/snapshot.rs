// 📋 Snapshot Model
// One fetch = one table = header row + data rows

use serde::{Deserialize, Serialize};

/// One table record, cells in page order
pub type Row = Vec<String>;

/// Separator used everywhere rows are written as text
pub const CELL_SEPARATOR: &str = " | ";

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Snapshot - The table extracted from a single fetch
///
/// `rows[0]` is the header row, the rest are data rows.
/// Zero rows means the page had no table at all, which is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: Vec<Row>,
}

impl Snapshot {
    /// Snapshot with no rows ("no table found")
    pub fn empty() -> Self {
        Snapshot { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Snapshot { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row, if a table was found
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Everything after the header
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Rows worth writing out: the header plus every data row with cells
    pub fn persistable_rows(&self) -> impl Iterator<Item = &Row> {
        self.header()
            .into_iter()
            .chain(self.data_rows().iter().filter(|row| !row.is_empty()))
    }

    /// Pretty print as pipe-delimited lines
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "No data to print.".to_string();
        }

        self.rows
            .iter()
            .map(|row| row.join(CELL_SEPARATOR))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// TESTS
// ============================================================================
