use indicatif::{ProgressBar, ProgressStyle};
use sheetprobe_core::sweep::{ProgressCallback, SweepProgress};
use std::time::Duration;

/// Spinner for ad-hoc checks; shows how many domains are done and the last one.
pub struct CheckSpinner {
    progress: ProgressBar,
    total: usize,
}

impl CheckSpinner {
    pub fn new(total: usize) -> Self {
        Self::with_bar(ProgressBar::new_spinner(), total)
    }

    fn with_bar(progress: ProgressBar, total: usize) -> Self {
        progress.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["◐", "◓", "◑", "◒", "●"])
                .template("{spinner:.green} {msg} {elapsed:.dim}")
                .expect("Spinner template is hardcoded and should be valid"),
        );
        progress.set_message(format!("Checking 0/{}", total));
        if !progress.is_hidden() {
            progress.enable_steady_tick(Duration::from_millis(120));
        }

        Self { progress, total }
    }

    /// Callback that advances the spinner as checks complete
    pub fn progress_callback(&self) -> ProgressCallback {
        let progress = self.progress.clone();
        let total = self.total;
        Box::new(move |event: SweepProgress<'_>| {
            if let SweepProgress::Checked {
                completed, result, ..
            } = event
            {
                progress.set_message(format!(
                    "Checking {}/{} (last: {})",
                    completed, total, result.domain
                ));
            }
        })
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

impl Drop for CheckSpinner {
    fn drop(&mut self) {
        self.progress.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;
    use sheetprobe_core::{ProbeOutcome, ProbeResult};

    #[test]
    fn test_message_tracks_completed_checks() {
        let spinner = CheckSpinner::with_bar(
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()),
            3,
        );
        assert_eq!(spinner.progress.message(), "Checking 0/3");

        let result = ProbeResult {
            domain: "example.com".to_string(),
            url: "https://example.com".to_string(),
            outcome: ProbeOutcome::Ok,
            duration_ms: 5,
        };
        let callback = spinner.progress_callback();
        callback(SweepProgress::Checking {
            domain: "example.com",
        });
        assert_eq!(spinner.progress.message(), "Checking 0/3");

        callback(SweepProgress::Checked {
            completed: 2,
            total: 3,
            result: &result,
        });
        assert_eq!(
            spinner.progress.message(),
            "Checking 2/3 (last: example.com)"
        );
    }
}
