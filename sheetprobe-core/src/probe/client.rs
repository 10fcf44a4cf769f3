use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use super::types::{ProbeOutcome, ProbeResult, Scheme};
use crate::error::Result;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_USER_AGENT: &str = concat!("sheetprobe/", env!("CARGO_PKG_VERSION"));

/// Anything that can classify a domain with a single request.
pub trait Probe: Send + Sync {
    fn check(&self, domain: &str) -> impl Future<Output = ProbeResult> + Send;
}

/// Request settings shared by every probe of a sweep
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    pub scheme: Scheme,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scheme: Scheme::default(),
        }
    }
}

impl ProbeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for the whole request, connect included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many redirects are followed; 0 reports the redirect status itself
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }
}

/// Client issuing one GET per domain and classifying the response
#[derive(Debug, Clone)]
pub struct ProbeClient {
    client: reqwest::Client,
    scheme: Scheme,
}

impl ProbeClient {
    /// Create a client; the underlying connection pool is shared by all checks
    pub fn new(settings: ProbeSettings) -> Result<Self> {
        let redirect = if settings.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(settings.max_redirects)
        };

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(redirect)
            .user_agent(settings.user_agent)
            .build()?;

        Ok(Self {
            client,
            scheme: settings.scheme,
        })
    }

    /// Check a single domain
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn check(&self, domain: &str) -> ProbeResult {
        let url = self.scheme.url_for(domain);
        let start = Instant::now();

        let outcome = match self.client.get(&url).send().await {
            Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
            Err(e) => {
                debug!(error = %e, "Request failed");
                ProbeOutcome::Unreachable {
                    reason: e.to_string(),
                }
            }
        };

        ProbeResult {
            domain: domain.to_string(),
            url,
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Probe for ProbeClient {
    fn check(&self, domain: &str) -> impl Future<Output = ProbeResult> + Send {
        ProbeClient::check(self, domain)
    }
}
