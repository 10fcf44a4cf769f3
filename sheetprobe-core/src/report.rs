//! Log lines for individual probe results
//!
//! Each result becomes exactly one event on the [`RESULT_TARGET`] target, so
//! subscribers can route them to the log file without echoing them on stderr.

use tracing::{error, info, warn, Level};

use crate::probe::{ProbeOutcome, ProbeResult};

pub const RESULT_TARGET: &str = "sheetprobe::result";

/// Level and message for a result
pub fn result_message(result: &ProbeResult) -> (Level, String) {
    match result.outcome {
        ProbeOutcome::Unreachable { .. } => (
            Level::ERROR,
            format!("Error: {} - Unable to connect", result.url),
        ),
        ProbeOutcome::Ok => (Level::INFO, format!("Success: {} - 200 OK", result.url)),
        ProbeOutcome::Warning { status } => (
            Level::WARN,
            format!("Warning: {} - Status Code: {}", result.url, status),
        ),
    }
}

pub fn log_result(result: &ProbeResult) {
    let (level, message) = result_message(result);
    if level == Level::ERROR {
        error!(target: RESULT_TARGET, "{}", message);
    } else if level == Level::WARN {
        warn!(target: RESULT_TARGET, "{}", message);
    } else {
        info!(target: RESULT_TARGET, "{}", message);
    }
}
