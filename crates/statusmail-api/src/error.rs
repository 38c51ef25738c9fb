use thiserror::Error;

/// Top-level error type for the `statusmail-api` crate.
///
/// Covers every failure mode of a delivery attempt: transport, relay
/// authentication, relay-side rejection, and response decoding.
/// `statusmail-core` folds these into a single delivery failure.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The relay rejected the configured API key (HTTP 401 / 403).
    #[error("Invalid mail relay API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Relay ───────────────────────────────────────────────────────
    /// Rate limited by the relay. Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The relay answered with a non-success status.
    #[error("Mail relay rejected the message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this workspace retries on its own; the flag is surfaced
    /// in logs so operators can tell a flaky relay from a misconfigured one.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status returned by the relay, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Rejected { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}
