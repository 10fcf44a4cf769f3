use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use tracing::debug;

use crate::error::{Result, SheetProbeError};

/// Source of named worksheets.
pub trait SheetSource {
    /// Name used for this source in reports
    fn label(&self) -> String;

    /// Worksheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Cells of a worksheet, `None` when no worksheet has this name
    fn worksheet(&mut self, name: &str) -> Result<Option<Range<Data>>>;
}

/// A workbook file on disk (xlsx, xlsm, xlsb, xls or ods)
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Open a workbook, picking the reader from the file extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening workbook");
        let sheets = open_workbook_auto(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetSource for Workbook {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn worksheet(&mut self, name: &str) -> Result<Option<Range<Data>>> {
        if !self.sheets.sheet_names().iter().any(|n| n == name) {
            return Ok(None);
        }

        self.sheets
            .worksheet_range(name)
            .map(Some)
            .map_err(|e| SheetProbeError::WorksheetUnreadable {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = Workbook::open("/nonexistent/domains.xlsx");
        assert!(matches!(result, Err(SheetProbeError::Workbook(_))));
    }

    #[test]
    fn test_open_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(Workbook::open(file.path()).is_err());
    }

    #[test]
    fn test_open_corrupt_xlsx() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();
        assert!(Workbook::open(file.path()).is_err());
    }
}
