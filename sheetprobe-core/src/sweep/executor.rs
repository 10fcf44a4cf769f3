use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::probe::{Probe, ProbeResult};
use crate::report::log_result;
use crate::workbook::DomainEntry;

/// Progress notifications emitted while a batch of checks runs
#[derive(Debug, Clone, Copy)]
pub enum SweepProgress<'a> {
    /// A check for `domain` is about to be sent
    Checking { domain: &'a str },
    /// A check finished; `completed` of `total` are done
    Checked {
        completed: usize,
        total: usize,
        result: &'a ProbeResult,
    },
}

pub type ProgressCallback = Box<dyn Fn(SweepProgress<'_>) + Send + Sync>;

/// Probe result tied back to the sheet row it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowResult {
    pub row: u32,
    #[serde(flatten)]
    pub probe: ProbeResult,
}

/// Runs independent checks with bounded concurrency
#[derive(Debug, Clone)]
pub struct SweepExecutor<P> {
    probe: P,
    concurrency: usize,
}

impl<P: Probe> SweepExecutor<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            concurrency: 10,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Check every entry, logging each result as it completes.
    ///
    /// Results come back in completion order.
    pub async fn execute(
        &self,
        entries: Vec<DomainEntry>,
        progress: Option<&ProgressCallback>,
    ) -> Vec<RowResult> {
        let total = entries.len();
        let completed = Arc::new(AtomicUsize::new(0));

        debug!(
            total = total,
            concurrency = self.concurrency,
            "Starting checks"
        );

        stream::iter(entries)
            .map(|entry| {
                let completed = completed.clone();
                let probe = &self.probe;

                async move {
                    if let Some(progress) = progress {
                        progress(SweepProgress::Checking {
                            domain: &entry.domain,
                        });
                    }

                    let result = probe.check(&entry.domain).await;
                    log_result(&result);

                    let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(progress) = progress {
                        progress(SweepProgress::Checked {
                            completed: count,
                            total,
                            result: &result,
                        });
                    }

                    RowResult {
                        row: entry.row,
                        probe: result,
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutcome;
    use crate::report::RESULT_TARGET;
    use crate::sweep::testing::{entries, FakeProbe, LogCapture};
    use tracing::Level;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_every_entry_is_checked_once() {
        let probe = FakeProbe::new()
            .with_status("ok.com", 200)
            .with_status("moved.com", 301)
            .unreachable("down.com");
        let executor = SweepExecutor::new(probe.clone()).with_concurrency(2);

        let mut results = executor
            .execute(entries(&[(2, "ok.com"), (3, "moved.com"), (5, "down.com")]), None)
            .await;
        results.sort_by_key(|r| r.row);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].row, 2);
        assert_eq!(results[0].probe.outcome, ProbeOutcome::Ok);
        assert_eq!(
            results[1].probe.outcome,
            ProbeOutcome::Warning { status: 301 }
        );
        assert_eq!(results[2].row, 5);
        assert!(matches!(
            results[2].probe.outcome,
            ProbeOutcome::Unreachable { .. }
        ));
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test]
    async fn test_progress_reports_each_check() {
        let executor = SweepExecutor::new(FakeProbe::new()).with_concurrency(3);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let callback: ProgressCallback = Box::new(move |event: SweepProgress<'_>| {
            let line = match event {
                SweepProgress::Checking { domain } => format!("checking {}", domain),
                SweepProgress::Checked {
                    completed, total, ..
                } => format!("checked {}/{}", completed, total),
            };
            sink.lock().unwrap().push(line);
        });

        executor
            .execute(entries(&[(2, "a.com"), (3, "b.com")]), Some(&callback))
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.contains(&"checking a.com".to_string()));
        assert!(seen.contains(&"checking b.com".to_string()));
        assert!(seen.contains(&"checked 1/2".to_string()));
        assert!(seen.contains(&"checked 2/2".to_string()));
    }

    #[tokio::test]
    async fn test_one_result_line_per_domain() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        let probe = FakeProbe::new()
            .with_status("moved.com", 302)
            .unreachable("down.com");
        SweepExecutor::new(probe)
            .execute(
                entries(&[(2, "ok.com"), (3, "moved.com"), (4, "down.com")]),
                None,
            )
            .await;

        let mut lines = capture.lines(RESULT_TARGET);
        lines.sort_by(|a, b| a.1.cmp(&b.1));
        assert_eq!(
            lines,
            vec![
                (
                    Level::ERROR,
                    "Error: https://down.com - Unable to connect".to_string()
                ),
                (
                    Level::INFO,
                    "Success: https://ok.com - 200 OK".to_string()
                ),
                (
                    Level::WARN,
                    "Warning: https://moved.com - Status Code: 302".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let executor = SweepExecutor::new(FakeProbe::new());
        let results = executor.execute(Vec::new(), None).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_concurrency_floor() {
        let executor = SweepExecutor::new(FakeProbe::new()).with_concurrency(0);
        assert_eq!(executor.concurrency(), 1);
    }
}
