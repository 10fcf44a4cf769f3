pub mod colors;
pub mod config;
pub mod error;
pub mod output;
pub mod probe;
pub mod report;
pub mod sweep;
pub mod workbook;

pub use error::{Result, SheetProbeError};

pub use config::{ColumnRef, SweepConfig};
pub use probe::{Probe, ProbeClient, ProbeOutcome, ProbeResult, ProbeSettings, Scheme};
pub use sweep::{SweepExecutor, SweepPlan, SweepReport, WorkbookSweep};
pub use workbook::{SheetSource, Workbook};

pub use output::{OutputFormat, OutputFormatter};
