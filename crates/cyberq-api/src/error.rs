use thiserror::Error;

/// Top-level error type for the `cyberq-api` crate.
///
/// Covers every way a single request against the device can fail.
/// `cyberq-core` never lets these escape the poll loop; they only surface
/// to callers of a write.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The device did not answer within the request timeout.
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    TimedOut { url: String, timeout_ms: u64 },

    /// TCP connection could not be established (refused, unreachable, DNS).
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionRefused { url: String, reason: String },

    /// The embedded server answered with a non-success status.
    #[error("Device returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Body could not be read or was not the document we expected.
    #[error("Malformed response from device: {message}")]
    MalformedResponse { message: String, body: String },

    /// The device echoed a different value than the one written.
    ///
    /// The appliance silently clamps out-of-range writes, so the echo is
    /// the only signal that a write did not take.
    #[error("Device rejected {key}={requested} (now reports {echoed})")]
    Rejected {
        key: String,
        requested: String,
        echoed: String,
    },

    // ── Construction ────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built or the request could not be sent.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl Error {
    /// Classify a `reqwest` failure into the transport taxonomy.
    pub(crate) fn from_reqwest(err: &reqwest::Error, url: &str, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::TimedOut {
                url: url.to_owned(),
                timeout_ms,
            }
        } else if err.is_connect() {
            Self::ConnectionRefused {
                url: url.to_owned(),
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            }
        } else if err.is_body() || err.is_decode() {
            Self::MalformedResponse {
                message: err.to_string(),
                body: String::new(),
            }
        } else {
            Self::Client(err.to_string())
        }
    }

    /// Returns `true` if the device could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::ConnectionRefused { .. })
    }

    /// Returns `true` if this is a transient error that a later poll may not hit.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TimedOut { .. } | Self::ConnectionRefused { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short machine-friendly name of the failure kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimedOut { .. } => "timed_out",
            Self::ConnectionRefused { .. } => "connection_refused",
            Self::HttpStatus { .. } => "http_status",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Rejected { .. } => "rejected",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Client(_) => "client",
        }
    }
}
