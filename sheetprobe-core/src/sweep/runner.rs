use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::executor::{ProgressCallback, RowResult, SweepExecutor};
use crate::config::ColumnRef;
use crate::probe::{Probe, ProbeOutcome};
use crate::workbook::{scan_column, ScanOutcome, SheetSource};

/// What to scan in each worksheet and how often
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Worksheets in the order they are swept; empty means all of them
    pub worksheets: Vec<String>,
    pub column: ColumnRef,
    pub header_rows: u32,
    pub empty_run_limit: usize,
    /// `None` keeps rescanning until a pass ends on an empty run
    pub max_passes: Option<u32>,
    pub pass_delay: Duration,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            worksheets: Vec::new(),
            column: ColumnRef::default(),
            header_rows: 1,
            empty_run_limit: 5,
            max_passes: None,
            pass_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub ok: usize,
    pub warning: usize,
    pub unreachable: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Ok => self.ok += 1,
            ProbeOutcome::Warning { .. } => self.warning += 1,
            ProbeOutcome::Unreachable { .. } => self.unreachable += 1,
        }
    }

    pub fn add(&mut self, other: &OutcomeCounts) {
        self.ok += other.ok;
        self.warning += other.warning;
        self.unreachable += other.unreachable;
    }

    pub fn total(&self) -> usize {
        self.ok + self.warning + self.unreachable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorksheetStatus {
    Checked,
    Missing,
    Unreadable { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetReport {
    pub name: String,
    pub status: WorksheetStatus,
    pub passes: u32,
    /// How the last pass ended
    pub last_outcome: Option<ScanOutcome>,
    /// Counts summed over every pass
    pub counts: OutcomeCounts,
    /// Results of the last pass, by row
    pub results: Vec<RowResult>,
}

impl WorksheetReport {
    fn new(name: &str, status: WorksheetStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            passes: 0,
            last_outcome: None,
            counts: OutcomeCounts::default(),
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Workbook the domains came from
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub worksheets: Vec<WorksheetReport>,
}

impl SweepReport {
    pub fn totals(&self) -> OutcomeCounts {
        let mut totals = OutcomeCounts::default();
        for worksheet in &self.worksheets {
            totals.add(&worksheet.counts);
        }
        totals
    }
}

/// Sweeps the domain column of each worksheet in a workbook
pub struct WorkbookSweep<P> {
    executor: SweepExecutor<P>,
    plan: SweepPlan,
}

impl<P: Probe> WorkbookSweep<P> {
    pub fn new(executor: SweepExecutor<P>, plan: SweepPlan) -> Self {
        Self { executor, plan }
    }

    pub async fn run<S: SheetSource>(
        &self,
        source: &mut S,
        progress: Option<&ProgressCallback>,
    ) -> SweepReport {
        let started_at = Utc::now();
        let start = Instant::now();

        let names = if self.plan.worksheets.is_empty() {
            source.sheet_names()
        } else {
            self.plan.worksheets.clone()
        };
        debug!(worksheets = names.len(), column = %self.plan.column, "Starting sweep");

        let mut worksheets = Vec::with_capacity(names.len());
        for name in &names {
            worksheets.push(self.sweep_worksheet(source, name, progress).await);
        }

        SweepReport {
            source: source.label(),
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            worksheets,
        }
    }

    async fn sweep_worksheet<S: SheetSource>(
        &self,
        source: &mut S,
        name: &str,
        progress: Option<&ProgressCallback>,
    ) -> WorksheetReport {
        let range = match source.worksheet(name) {
            Ok(Some(range)) => range,
            Ok(None) => {
                warn!("Worksheet '{}' not found.", name);
                return WorksheetReport::new(name, WorksheetStatus::Missing);
            }
            Err(e) => {
                error!("Failed to read worksheet '{}': {}", name, e);
                return WorksheetReport::new(
                    name,
                    WorksheetStatus::Unreadable {
                        error: e.to_string(),
                    },
                );
            }
        };

        info!("Processing worksheet: {}", name);
        let mut report = WorksheetReport::new(name, WorksheetStatus::Checked);

        loop {
            let scan = scan_column(
                &range,
                self.plan.column,
                self.plan.header_rows,
                self.plan.empty_run_limit,
            );

            let mut results = self.executor.execute(scan.entries, progress).await;
            results.sort_by_key(|r| r.row);
            for result in &results {
                report.counts.record(&result.probe.outcome);
            }

            report.passes += 1;
            report.results = results;
            report.last_outcome = Some(scan.outcome);

            match scan.outcome {
                ScanOutcome::Terminated { .. } => {
                    warn!(
                        "{} consecutive empty cells encountered. Starting a new loop for the next worksheet.",
                        count_word(self.plan.empty_run_limit)
                    );
                    break;
                }
                ScanOutcome::Exhausted => {
                    info!("Worksheet processed successfully.");
                    if report.results.is_empty() {
                        debug!(worksheet = name, "No domains found, not rescanning");
                        break;
                    }
                    if self
                        .plan
                        .max_passes
                        .is_some_and(|max| report.passes >= max)
                    {
                        break;
                    }
                    if !self.plan.pass_delay.is_zero() {
                        sleep(self.plan.pass_delay).await;
                    }
                }
            }
        }

        report
    }
}

/// Capitalized English word for small counts, digits otherwise
fn count_word(n: usize) -> String {
    const WORDS: [&str; 10] = [
        "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
    ];
    WORDS
        .get(n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}
