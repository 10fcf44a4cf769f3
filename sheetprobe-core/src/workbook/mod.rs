//! Reading domain columns out of spreadsheet workbooks

mod reader;
mod scan;

pub use reader::{SheetSource, Workbook};
pub use scan::{cell_text, scan_column, ColumnScan, DomainEntry, ScanOutcome};
