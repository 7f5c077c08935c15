use thiserror::Error;

/// Top-level error type for the `hartkey-api` crate.
///
/// Covers transport, authentication, and response-shape failures.
/// `hartkey-core` decides which of these are hard failures for a
/// refresh cycle and which are absorbed.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bearer token was rejected (HTTP 401).
    #[error("Bearer token rejected by the API")]
    InvalidToken,

    /// The token could not be turned into a request header.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request did not complete within its bound.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-200 response. The body is kept verbatim for diagnostics.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// HTTP 400 from the events endpoint.
    #[error("API rejected request parameters: {body}")]
    Validation { body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Body was not valid JSON, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credential was rejected and retrying with
    /// the same token cannot succeed.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidToken => Some(401),
            Self::Validation { .. } => Some(400),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn auth_classification() {
        assert!(Error::InvalidToken.is_auth_error());
        assert!(!Error::Timeout { timeout_secs: 10 }.is_auth_error());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(503));

        let err = Error::Validation { body: "{}".into() };
        assert!(!err.is_transient());
        assert_eq!(err.status(), Some(400));
    }
}
