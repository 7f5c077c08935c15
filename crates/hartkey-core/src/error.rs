// ── Core error types ──
//
// User-facing errors from hartkey-core. Consumers never see raw HTTP
// or JSON failures; the `From<hartkey_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the Hartkey API: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response shape: {message}")]
    MalformedResponse { message: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Device {identifier} has no enabled open_door capability")]
    NotActionable { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Open command failed (HTTP {status}): {body}")]
    CommandFailed { status: u16, body: String },

    #[error("Refresh cancelled: coordinator is shutting down")]
    Cancelled,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The credential was rejected; the user has to supply a new token.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hartkey_api::Error> for CoreError {
    fn from(err: hartkey_api::Error) -> Self {
        match err {
            hartkey_api::Error::InvalidToken => CoreError::AuthenticationFailed {
                message: "bearer token rejected (HTTP 401)".into(),
            },
            hartkey_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            hartkey_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            }
            hartkey_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hartkey_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            hartkey_api::Error::Api { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
                status: Some(status),
            },
            hartkey_api::Error::Validation { body } => CoreError::Api {
                message: body,
                status: Some(400),
            },
            hartkey_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}
