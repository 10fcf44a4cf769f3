//! Progress bar for sweeps, with tracing output routed around it.
//!
//! While a sweep bar is registered, stderr log lines are printed through the
//! bar so they appear above it instead of tearing the display.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// Global holder for the active sweep progress bar.
static SWEEP_PROGRESS_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active_bar() -> MutexGuard<'static, Option<ProgressBar>> {
    SWEEP_PROGRESS_BAR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Build the bar shown while worksheets are being checked
pub fn sweep_progress_bar() -> ProgressBar {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Progress bar template is hardcoded and should be valid")
            .progress_chars("█▓░"),
    );
    progress
}

/// Route tracing output through `pb` until [`clear_sweep_progress_bar`] is called.
pub fn set_sweep_progress_bar(pb: ProgressBar) {
    *active_bar() = Some(pb);
}

pub fn clear_sweep_progress_bar() {
    *active_bar() = None;
}

fn emit_line(line: &str) -> std::io::Result<()> {
    let bar = active_bar().clone();
    match bar {
        Some(pb) => {
            pb.println(line);
            Ok(())
        }
        None => {
            let mut stderr = std::io::stderr();
            stderr.write_all(line.as_bytes())?;
            stderr.write_all(b"\n")
        }
    }
}

/// Line-buffering writer that hands complete lines to the bar or to stderr.
pub struct ProgressWriter {
    buffer: Vec<u8>,
}

impl ProgressWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }
}

impl Default for ProgressWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line_str = String::from_utf8_lossy(&line);
            emit_line(line_str.trim_end_matches('\n'))?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let line_str = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();

            let trimmed = line_str.trim_end();
            if !trimmed.is_empty() {
                emit_line(trimmed)?;
            }
        }
        Ok(())
    }
}

impl Drop for ProgressWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// A MakeWriter implementation for tracing-subscriber that creates ProgressWriters.
pub struct ProgressWriterFactory;

impl ProgressWriterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProgressWriterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ProgressWriterFactory {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ProgressWriter::new()
    }
}
