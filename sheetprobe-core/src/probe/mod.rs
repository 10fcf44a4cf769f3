//! Domain probing
//!
//! One GET request per domain, classified as:
//! - unreachable (no response at all)
//! - OK (HTTP 200)
//! - warning (any other status code)

mod client;
mod types;

pub use client::{Probe, ProbeClient, ProbeSettings};
pub use types::{ProbeOutcome, ProbeResult, Scheme};
