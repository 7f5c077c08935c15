//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hartkey_config::ConfigError;
use hartkey_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const COMMAND: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Hartkey API")]
    #[diagnostic(
        code(hartkey::connection_failed),
        help("Check your network connection.\nDetails: {reason}")
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The bearer token was rejected")]
    #[diagnostic(
        code(hartkey::auth_failed),
        help(
            "The token has expired or is invalid. Store a new one with:\n\
             hartkey config set-token"
        )
    )]
    AuthFailed,

    #[error("No bearer token configured")]
    #[diagnostic(
        code(hartkey::no_credentials),
        help(
            "Configure one with: hartkey config init\n\
             Or set the HARTKEY_TOKEN environment variable."
        )
    )]
    NoCredentials,

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(hartkey::not_found),
        help("Run: hartkey devices to see available devices")
    )]
    NotFound { identifier: String },

    #[error("Device '{identifier}' cannot be opened")]
    #[diagnostic(
        code(hartkey::not_actionable),
        help("Run: hartkey devices --actionable to see devices you can open")
    )]
    NotActionable { identifier: String },

    #[error("Open command failed (HTTP {status})")]
    #[diagnostic(code(hartkey::command_failed), help("Server said: {body}"))]
    CommandFailed { status: u16, body: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(hartkey::api_error))]
    ApiError { message: String },

    #[error("Unexpected response from the API: {message}")]
    #[diagnostic(code(hartkey::malformed_response))]
    MalformedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hartkey::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(hartkey::config),
        help("Check the config file, or recreate it with: hartkey config init")
    )]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(hartkey::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout { seconds: u64 },

    #[error("Interrupted")]
    #[diagnostic(code(hartkey::cancelled))]
    Cancelled,

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NotActionable { .. } | Self::CommandFailed { .. } => exit_code::COMMAND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials => CliError::NoCredentials,
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed,

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound { identifier },

            CoreError::NotActionable { identifier } => CliError::NotActionable { identifier },

            CoreError::CommandFailed { status, body } => CliError::CommandFailed { status, body },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::Api { message, status: _ } => CliError::ApiError { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<hartkey_api::Error> for CliError {
    fn from(err: hartkey_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "x".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing: CliError = CoreError::DeviceNotFound {
            identifier: "9".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let offline: CliError = CoreError::ConnectionFailed {
            reason: "dns".into(),
        }
        .into();
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);

        let slow: CliError = CoreError::Timeout { timeout_secs: 10 }.into();
        assert_eq!(slow.exit_code(), exit_code::TIMEOUT);

        assert_eq!(CliError::from(ConfigError::NoCredentials).exit_code(), exit_code::AUTH);
    }
}
