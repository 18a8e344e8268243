use tracing::{debug, info};

use crate::model::{CellValue, DataTable};
use crate::text::normalize;

/// A successful header discovery: the matched row index in the raw table and
/// the table with that row promoted to column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMatch {
    pub row_index: usize,
    pub table: DataTable,
}

/// Scans a headerless table for the first row whose normalized cell values
/// contain every expected token, then promotes that row to column labels.
///
/// All rows at or above the match are discarded and the remainder reindexed
/// from zero. `None` means no row qualified and the table is unusable; no
/// partial result is ever produced.
pub fn discover_header(raw: &DataTable, expected_tokens: &[String]) -> Option<HeaderMatch> {
    let expected: Vec<String> = expected_tokens
        .iter()
        .map(|token| normalize(token))
        .filter(|token| !token.is_empty())
        .collect();

    for (row_index, row) in raw.rows.iter().enumerate() {
        let normalized: Vec<String> = row
            .iter()
            .map(|cell| normalize(&cell.display()))
            .collect();
        if expected.iter().all(|token| normalized.contains(token)) {
            info!(row_index, "header row located");
            return Some(HeaderMatch {
                row_index,
                table: promote_header(raw, row_index),
            });
        }
        debug!(row_index, "row did not satisfy header tokens");
    }

    None
}

/// Promoted column labels are the matched row's display values, trimmed and
/// lower-cased the way criteria columns are normalized.
fn promote_header(raw: &DataTable, header_index: usize) -> DataTable {
    let columns: Vec<String> = raw.rows[header_index]
        .iter()
        .map(|cell| cell.display().trim().to_lowercase())
        .collect();
    let rows: Vec<Vec<CellValue>> = raw.rows[header_index + 1..].to_vec();
    DataTable { columns, rows }
}
