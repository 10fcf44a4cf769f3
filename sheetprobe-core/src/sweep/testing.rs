//! Test doubles for sweep tests

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::probe::{Probe, ProbeOutcome, ProbeResult, Scheme};
use crate::workbook::DomainEntry;

/// Probe answering from a fixed table; unknown domains answer 200.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    outcomes: Arc<HashMap<String, ProbeOutcome>>,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(self, domain: &str, status: u16) -> Self {
        self.with_outcome(domain, ProbeOutcome::from_status(status))
    }

    pub fn unreachable(self, domain: &str) -> Self {
        self.with_outcome(
            domain,
            ProbeOutcome::Unreachable {
                reason: "connection refused".to_string(),
            },
        )
    }

    fn with_outcome(self, domain: &str, outcome: ProbeOutcome) -> Self {
        let mut outcomes = (*self.outcomes).clone();
        outcomes.insert(domain.to_string(), outcome);
        Self {
            outcomes: Arc::new(outcomes),
            calls: self.calls,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for FakeProbe {
    fn check(&self, domain: &str) -> impl Future<Output = ProbeResult> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .get(domain)
            .cloned()
            .unwrap_or(ProbeOutcome::Ok);
        let result = ProbeResult {
            domain: domain.to_string(),
            url: Scheme::Https.url_for(domain),
            outcome,
            duration_ms: 0,
        };

        async move {
            tokio::task::yield_now().await;
            result
        }
    }
}

pub fn entries(rows: &[(u32, &str)]) -> Vec<DomainEntry> {
    rows.iter()
        .map(|(row, domain)| DomainEntry {
            row: *row,
            domain: domain.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Layer recording every event emitted while it is installed
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread-local subscriber; events stop being recorded when the guard drops
    pub fn install(&self) -> DefaultGuard {
        tracing_subscriber::registry()
            .with(self.clone())
            .set_default()
    }

    /// Events on `target` above DEBUG, in emission order
    pub fn lines(&self, target: &str) -> Vec<(Level, String)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.target == target)
            .filter(|e| e.level != Level::DEBUG && e.level != Level::TRACE)
            .map(|e| (e.level, e.message.clone()))
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.0,
        });
    }
}
