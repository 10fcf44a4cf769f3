use colored::Colorize;

use super::OutputFormatter;
use crate::colors::CatppuccinExt;
use crate::probe::{ProbeOutcome, ProbeResult};
use crate::sweep::{OutcomeCounts, SweepReport, WorksheetReport, WorksheetStatus};
use crate::workbook::ScanOutcome;

fn format_duration(duration_ms: u64) -> String {
    if duration_ms < 1000 {
        return format!("{}ms", duration_ms);
    }
    let total_secs = duration_ms / 1000;
    if total_secs < 60 {
        format!("{:.1}s", duration_ms as f64 / 1000.0)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.sky().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            text.overlay1().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_colors {
            format!(
                "\n{}\n{}",
                text.lavender().bold(),
                "─".repeat(text.chars().count()).subtext0()
            )
        } else {
            format!("\n{}\n{}", text, "-".repeat(text.chars().count()))
        }
    }

    fn outcome(&self, outcome: &ProbeOutcome) -> String {
        match outcome {
            ProbeOutcome::Ok => self.success("✓ 200 OK"),
            ProbeOutcome::Warning { status } => self.warning(&format!("! {}", status)),
            ProbeOutcome::Unreachable { .. } => self.error("✗ unreachable"),
        }
    }

    fn counts(&self, counts: &OutcomeCounts) -> String {
        format!(
            "{}  {}  {}",
            self.success(&format!("{} OK", counts.ok)),
            self.warning(&plural(counts.warning, "warning", "warnings")),
            self.error(&format!("{} unreachable", counts.unreachable)),
        )
    }

    fn worksheet(&self, worksheet: &WorksheetReport) -> Vec<String> {
        let mut output = Vec::new();
        let name = self.label(&worksheet.name);

        match worksheet.status {
            WorksheetStatus::Missing => {
                output.push(format!("  {}: {}", name, self.warning("not found")));
                return output;
            }
            WorksheetStatus::Unreadable { ref error } => {
                output.push(format!(
                    "  {}: {} {}",
                    name,
                    self.error("unreadable"),
                    self.dim(error)
                ));
                return output;
            }
            WorksheetStatus::Checked => {}
        }

        let ending = match worksheet.last_outcome {
            Some(ScanOutcome::Terminated { row }) => {
                format!("stopped at empty run ending row {}", row)
            }
            Some(ScanOutcome::Exhausted) | None => "reached last row".to_string(),
        };
        output.push(format!(
            "  {}: {}, {}",
            name,
            self.value(&plural(worksheet.passes as usize, "pass", "passes")),
            self.dim(&ending)
        ));
        output.push(format!("    {}", self.counts(&worksheet.counts)));

        for result in worksheet.results.iter().filter(|r| !r.probe.outcome.is_ok()) {
            output.push(format!(
                "    {} {}  {}",
                self.dim(&format!("row {:>5}", result.row)),
                self.value(&result.probe.url),
                self.outcome(&result.probe.outcome)
            ));
        }

        output
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &SweepReport) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("Sweep: {}", report.source)));

        if report.worksheets.is_empty() {
            output.push(format!("  {}", self.warning("No worksheets to check")));
        }

        for worksheet in &report.worksheets {
            output.extend(self.worksheet(worksheet));
        }

        output.push(String::new());
        output.push(format!(
            "  {}: {} {}",
            self.label("Total"),
            self.counts(&report.totals()),
            self.dim(&format!("in {}", format_duration(report.duration_ms)))
        ));

        output.join("\n")
    }

    fn format_probe(&self, result: &ProbeResult) -> String {
        let mut line = format!(
            "  {}  {} {}",
            self.outcome(&result.outcome),
            self.value(&result.url),
            self.dim(&format!("({})", format_duration(result.duration_ms)))
        );

        if let ProbeOutcome::Unreachable { ref reason } = result.outcome {
            line.push_str(&format!("\n      {}", self.dim(reason)));
        }

        line
    }
}
