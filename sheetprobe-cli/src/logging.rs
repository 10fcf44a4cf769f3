//! Tracing setup: stderr for diagnostics, an append-only file for the sweep log.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use chrono::Local;
use sheetprobe_core::report::RESULT_TARGET;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::display::ProgressWriterFactory;

/// Result lines only go to the log file unless RUST_LOG asks for them
const DEFAULT_STDERR_FILTER: &str = "warn,sheetprobe::result=off";

/// `2024-05-01 12:00:00,123 - WARNING - message`
pub struct LogLineFormat;

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level_name(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn file_filter() -> Targets {
    Targets::new()
        .with_target("sheetprobe_core", Level::INFO)
        .with_target(RESULT_TARGET, Level::INFO)
}

/// Install the global subscriber; `log_file` is created if missing and appended to.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<()> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDERR_FILTER));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(ProgressWriterFactory::new())
        .with_filter(stderr_filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;

            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LogLineFormat)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(file_filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(emit: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(LogLineFormat)
            .with_max_level(Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, emit);

        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_line_layout() {
        let output = capture(|| tracing::warn!("Warning: https://a.com - Status Code: 404"));

        let line = output.lines().next().unwrap();
        let parts: Vec<&str> = line.splitn(3, " - ").collect();
        assert_eq!(parts.len(), 3);

        // 2024-05-01 12:00:00,123
        let timestamp = parts[0];
        assert_eq!(timestamp.len(), 23);
        assert_eq!(&timestamp[10..11], " ");
        assert_eq!(&timestamp[19..20], ",");

        assert_eq!(parts[1], "WARNING");
        assert_eq!(parts[2], "Warning: https://a.com - Status Code: 404");
    }

    #[test]
    fn test_level_names() {
        let output = capture(|| {
            tracing::info!("one");
            tracing::error!("two");
            tracing::debug!("filtered");
        });

        let levels: Vec<&str> = output
            .lines()
            .map(|l| l.splitn(3, " - ").nth(1).unwrap())
            .collect();
        assert_eq!(levels, vec!["INFO", "ERROR"]);
    }

    #[test]
    fn test_file_filter_keeps_sweep_targets() {
        // Targets is prefix based, so every sheetprobe_core module is covered
        let targets = file_filter();
        assert!(targets.would_enable("sheetprobe_core::sweep::runner", &Level::INFO));
        assert!(targets.would_enable(RESULT_TARGET, &Level::ERROR));
        assert!(!targets.would_enable("sheetprobe_core::probe::client", &Level::DEBUG));
        assert!(!targets.would_enable("hyper::proto", &Level::INFO));
    }
}
