//! Sweep configuration loaded from TOML
//!
//! Every key is optional; command-line flags are layered on top by the CLI.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetProbeError};
use crate::probe::{ProbeSettings, Scheme};
use crate::sweep::SweepPlan;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "sheetprobe.toml";

/// A spreadsheet column, stored zero-based.
///
/// Parses from a 1-based number (`2`, `"2"`) or from column letters (`"B"`, `"aa"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawColumn", into = "RawColumn")]
pub struct ColumnRef(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Number(i64),
    Text(String),
}

impl ColumnRef {
    /// Column from a zero-based index
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    /// Column letters as shown in spreadsheet headers (0 -> A, 26 -> AA)
    pub fn letters(&self) -> String {
        let mut n = self.0 as u64 + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = ((n - 1) % 26) as u8;
            letters.push((b'A' + rem) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }

    fn from_number(number: i64) -> Result<Self> {
        if number < 1 || number > u32::MAX as i64 {
            return Err(SheetProbeError::InvalidColumn(number.to_string()));
        }
        Ok(Self((number - 1) as u32))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}

impl FromStr for ColumnRef {
    type Err = SheetProbeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SheetProbeError::InvalidColumn(s.to_string()));
        }

        if s.chars().all(|c| c.is_ascii_digit()) {
            let number: i64 = s
                .parse()
                .map_err(|_| SheetProbeError::InvalidColumn(s.to_string()))?;
            return Self::from_number(number);
        }

        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SheetProbeError::InvalidColumn(s.to_string()));
        }

        let mut number: u64 = 0;
        for c in s.chars() {
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as u64 + 1;
            number = number * 26 + digit;
            if number > u32::MAX as u64 {
                return Err(SheetProbeError::InvalidColumn(s.to_string()));
            }
        }
        Self::from_number(number as i64)
    }
}

impl TryFrom<RawColumn> for ColumnRef {
    type Error = SheetProbeError;

    fn try_from(raw: RawColumn) -> Result<Self> {
        match raw {
            RawColumn::Number(n) => Self::from_number(n),
            RawColumn::Text(s) => s.parse(),
        }
    }
}

impl From<ColumnRef> for RawColumn {
    fn from(column: ColumnRef) -> Self {
        RawColumn::Text(column.letters())
    }
}

/// Everything a sweep needs, as read from `sheetprobe.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Spreadsheet to read (xlsx, xlsm, xlsb, xls, ods)
    pub workbook: Option<PathBuf>,
    /// Worksheets to check in order; empty means every worksheet
    pub worksheets: Vec<String>,
    pub domain_column: ColumnRef,
    /// Log file, opened in append mode
    pub log_file: PathBuf,
    pub timeout_secs: u64,
    /// Rows skipped above the data
    pub header_rows: u32,
    /// Consecutive empty cells that end a pass over a worksheet
    pub empty_run_limit: usize,
    pub concurrency: usize,
    /// Passes per worksheet; 0 repeats until a pass hits an empty run
    pub passes: u32,
    pub pass_delay_secs: u64,
    pub scheme: Scheme,
    pub max_redirects: usize,
    pub user_agent: Option<String>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            workbook: None,
            worksheets: Vec::new(),
            domain_column: ColumnRef::default(),
            log_file: PathBuf::from("sheetprobe.log"),
            timeout_secs: 10,
            header_rows: 1,
            empty_run_limit: 5,
            concurrency: 10,
            passes: 0,
            pass_delay_secs: 0,
            scheme: Scheme::Https,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

impl SweepConfig {
    /// Load `sheetprobe.toml` from the working directory, or defaults when absent
    pub fn load_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SheetProbeError::ConfigNotFound {
                path: path.display().to_string(),
            },
            _ => SheetProbeError::Io(e),
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Check the settings a sweep cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.workbook.is_none() {
            return Err(SheetProbeError::InvalidConfig(
                "no workbook given (set `workbook` or pass --workbook)".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(SheetProbeError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.empty_run_limit == 0 {
            return Err(SheetProbeError::InvalidConfig(
                "empty_run_limit must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(SheetProbeError::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        let settings = ProbeSettings::new()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_redirects(self.max_redirects)
            .with_scheme(self.scheme);

        match self.user_agent {
            Some(ref agent) => settings.with_user_agent(agent.clone()),
            None => settings,
        }
    }

    pub fn sweep_plan(&self) -> SweepPlan {
        SweepPlan {
            worksheets: self.worksheets.clone(),
            column: self.domain_column,
            header_rows: self.header_rows,
            empty_run_limit: self.empty_run_limit,
            max_passes: if self.passes == 0 {
                None
            } else {
                Some(self.passes)
            },
            pass_delay: Duration::from_secs(self.pass_delay_secs),
        }
    }
}
