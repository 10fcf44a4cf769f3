use std::fmt;

use serde::{Deserialize, Serialize};

/// URL scheme used to reach a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Https,
    Http,
}

impl Scheme {
    /// Build the request URL for a domain exactly as it appears in the sheet.
    pub fn url_for(&self, domain: &str) -> String {
        format!("{}://{}", self, domain)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Https => write!(f, "https"),
            Scheme::Http => write!(f, "http"),
        }
    }
}

/// Three-way classification of a single GET request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// No HTTP response was received at all
    Unreachable { reason: String },
    /// The server answered 200
    Ok,
    /// The server answered with any other status code
    Warning { status: u16 },
}

impl ProbeOutcome {
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            ProbeOutcome::Ok
        } else {
            ProbeOutcome::Warning { status }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Ok => Some(200),
            ProbeOutcome::Warning { status } => Some(*status),
            ProbeOutcome::Unreachable { .. } => None,
        }
    }
}

/// Result of probing one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Domain text as read from the sheet
    pub domain: String,
    /// URL that was requested
    pub url: String,
    pub outcome: ProbeOutcome,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_is_ok() {
        assert_eq!(ProbeOutcome::from_status(200), ProbeOutcome::Ok);
        assert_eq!(
            ProbeOutcome::from_status(201),
            ProbeOutcome::Warning { status: 201 }
        );
        assert_eq!(
            ProbeOutcome::from_status(301),
            ProbeOutcome::Warning { status: 301 }
        );
        assert_eq!(
            ProbeOutcome::from_status(503),
            ProbeOutcome::Warning { status: 503 }
        );
    }

    #[test]
    fn test_url_keeps_domain_verbatim() {
        assert_eq!(Scheme::Https.url_for("example.com"), "https://example.com");
        assert_eq!(
            Scheme::Http.url_for("Example.COM/path"),
            "http://Example.COM/path"
        );
    }

    #[test]
    fn test_outcome_serializes_with_result_tag() {
        let json = serde_json::to_string(&ProbeOutcome::Warning { status: 404 }).unwrap();
        assert_eq!(json, r#"{"result":"warning","status":404}"#);

        let json = serde_json::to_string(&ProbeOutcome::Ok).unwrap();
        assert_eq!(json, r#"{"result":"ok"}"#);
    }
}
