use calamine::{Data, Range};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ColumnRef;

/// A non-empty cell of the domain column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEntry {
    /// 1-based row number, as spreadsheet applications show it
    pub row: u32,
    pub domain: String,
}

/// How a pass over a column ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Ran past the last used row
    Exhausted,
    /// Hit the run of empty cells ending at `row` (1-based)
    Terminated { row: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnScan {
    pub entries: Vec<DomainEntry>,
    pub outcome: ScanOutcome,
}

/// Textual value of a cell, `None` for empty, blank and error cells.
///
/// Zero and `FALSE` are falsy placeholders, not domains, so they are empty too.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) | Data::Int(0) | Data::Bool(false) => return None,
        Data::Float(f) if *f == 0.0 => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collect the domains of one column, top to bottom.
///
/// Scanning starts below `header_rows` and stops early once `empty_run_limit`
/// consecutive empty cells have been seen.
pub fn scan_column(
    range: &Range<Data>,
    column: ColumnRef,
    header_rows: u32,
    empty_run_limit: usize,
) -> ColumnScan {
    let mut entries = Vec::new();

    let Some((last_row, _)) = range.end() else {
        return ColumnScan {
            entries,
            outcome: ScanOutcome::Exhausted,
        };
    };

    let mut empty_run = 0usize;
    for row in header_rows..=last_row {
        match range.get_value((row, column.index())).and_then(cell_text) {
            Some(domain) => {
                empty_run = 0;
                entries.push(DomainEntry {
                    row: row + 1,
                    domain,
                });
            }
            None => {
                empty_run += 1;
                if empty_run >= empty_run_limit {
                    debug!(row = row + 1, found = entries.len(), "Empty run ended scan");
                    return ColumnScan {
                        entries,
                        outcome: ScanOutcome::Terminated { row: row + 1 },
                    };
                }
            }
        }
    }

    ColumnScan {
        entries,
        outcome: ScanOutcome::Exhausted,
    }
}
