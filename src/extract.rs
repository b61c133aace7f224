// 🧾 Table Extractor
// Markup → Snapshot (first <table> only)

use crate::snapshot::{Row, Snapshot};
use log::{debug, warn};
use scraper::{ElementRef, Html};

/// Parse raw markup and extract the first table
pub fn extract_table(markup: &str) -> Snapshot {
    let document = Html::parse_document(markup);
    TableExtractor.extract(&document)
}

/// TableExtractor - Builds a Snapshot from a parsed document
///
/// Header row = every `<th>` in the table, in document order.
/// Data rows = the `<td>` cells of every `<tr>` after the first;
/// rows without `<td>` cells are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn extract(&self, document: &Html) -> Snapshot {
        let table = match find_first(document.root_element(), "table") {
            Some(table) => table,
            None => {
                warn!("No table found on the page.");
                return Snapshot::empty();
            }
        };

        let header: Row = descendants_named(table, "th").map(cell_text).collect();
        let mut rows = vec![header];

        for tr in descendants_named(table, "tr").skip(1) {
            let cells: Row = descendants_named(tr, "td").map(cell_text).collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        debug!("Extracted table with {} data rows", rows.len() - 1);
        Snapshot::from_rows(rows)
    }
}

fn descendants_named<'a>(
    root: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name().eq_ignore_ascii_case(name))
}

fn find_first<'a>(root: ElementRef<'a>, name: &'a str) -> Option<ElementRef<'a>> {
    descendants_named(root, name).next()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1>Availabilities</h1>
          <table class="units">
            <tr><th> Type </th><th>Price</th><th>Available</th></tr>
            <tr><td>Studio A</td><td> $3,750 </td><td>Now</td></tr>
            <tr><td>1 Bed <b>Corner</b></td><td>$4,200</td><td>2025-03-01</td></tr>
            <tr></tr>
          </table>
          <table><tr><th>Other</th></tr><tr><td>ignored</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_extracts_header_and_rows() {
        let snapshot = extract_table(PAGE);

        assert_eq!(
            snapshot.header().unwrap(),
            &vec!["Type".to_string(), "Price".to_string(), "Available".to_string()]
        );
        assert_eq!(snapshot.data_rows().len(), 2);
        assert_eq!(snapshot.data_rows()[0], vec!["Studio A", "$3,750", "Now"]);
        assert_eq!(snapshot.data_rows()[1], vec!["1 Bed Corner", "$4,200", "2025-03-01"]);
    }

    #[test]
    fn test_only_first_table_is_used() {
        let snapshot = extract_table(PAGE);

        assert!(snapshot
            .rows
            .iter()
            .all(|row| !row.contains(&"ignored".to_string())));
    }

    #[test]
    fn test_no_table_gives_empty_snapshot() {
        let snapshot = extract_table("<html><body><p>Nothing listed</p></body></html>");

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.header(), None);
        assert_ne!(snapshot, Snapshot::from_rows(vec![Vec::new()]));
    }

    #[test]
    fn test_table_without_th_keeps_empty_header() {
        let snapshot = extract_table(
            "<table><tr><td>skip me</td></tr><tr><td>Studio</td><td>$3,750</td></tr></table>",
        );

        assert_eq!(snapshot.rows.len(), 2);
        assert!(snapshot.header().unwrap().is_empty());
        assert_eq!(snapshot.data_rows()[0], vec!["Studio", "$3,750"]);
    }

    #[test]
    fn test_header_row_with_only_th_is_not_data() {
        let snapshot = extract_table(
            "<table><tr><th>Type</th></tr><tr><th>Sub</th></tr><tr><td>Loft</td></tr></table>",
        );

        assert_eq!(snapshot.header().unwrap(), &vec!["Type".to_string(), "Sub".to_string()]);
        assert_eq!(snapshot.data_rows(), &[vec!["Loft".to_string()]]);
    }
}
