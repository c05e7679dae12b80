use std::fmt;

/// Failure talking to the GitHub REST API.
///
/// Every fetch in a view batch funnels into one of these, so the view can
/// show a single message and the CLI can pick an exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 404 on a lookup (user, repository, ...)
    NotFound(String),
    /// Any other non-2xx response
    Upstream { status: u16, message: String },
    /// Connection, TLS or timeout failure
    Network(String),
    /// The response body did not have the expected shape
    Decode(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }

    /// Build an error from a non-2xx status and the raw response body.
    ///
    /// GitHub error bodies carry a `message` field; if the body has none the
    /// canonical reason phrase is used instead.
    pub fn from_status(status: u16, what: &str, body: &str) -> Self {
        if status == 404 {
            return FetchError::NotFound(what.to_string());
        }

        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Request failed")
                    .to_string()
            });
        FetchError::Upstream { status, message }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::NotFound(what) => write!(f, "{} not found", what),
            FetchError::Upstream { status, message } => {
                write!(f, "GitHub API error ({}): {}", status, message)
            }
            FetchError::Network(msg) => write!(f, "Network error: {}", msg),
            FetchError::Decode(msg) => write!(f, "Unexpected response from GitHub: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}
