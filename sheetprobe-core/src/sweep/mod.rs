mod executor;
mod runner;
#[cfg(test)]
pub(crate) mod testing;

pub use executor::{ProgressCallback, RowResult, SweepExecutor, SweepProgress};
pub use runner::{
    OutcomeCounts, SweepPlan, SweepReport, WorkbookSweep, WorksheetReport, WorksheetStatus,
};
