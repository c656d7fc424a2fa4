//! CLI error types with miette diagnostics.
//!
//! Maps core, setup and config failures into user-facing errors with
//! actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use cyberq_config::ConfigError;
use cyberq_core::{CoreError, ParseError, SetupError, TransportError, WriteError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the CyberQ at {target}")]
    #[diagnostic(
        code(cyberq::connection_failed),
        help(
            "Check that the controller is powered on and joined to your network.\n\
             Reason: {reason}\n\
             Try: cyberq probe <host>"
        )
    )]
    ConnectionFailed { target: String, reason: String },

    #[error("Request to {target} timed out after {millis}ms")]
    #[diagnostic(
        code(cyberq::timeout),
        help("Increase the timeout with --timeout or check the controller's WiFi signal.")
    )]
    Timeout { target: String, millis: u64 },

    #[error("Unexpected response from the device: {message}")]
    #[diagnostic(
        code(cyberq::unexpected_response),
        help("Make sure the host is a CyberQ WiFi and not another device on the same address.")
    )]
    UnexpectedResponse { message: String },

    // ── Writes ───────────────────────────────────────────────────────
    #[error("Device did not accept {field}={requested} (now reports {echoed})")]
    #[diagnostic(
        code(cyberq::rejected),
        help("The controller clamps values it cannot store. Check the allowed range for {field}.")
    )]
    Rejected {
        field: String,
        requested: String,
        echoed: String,
    },

    #[error("Device busy for {waited_ms}ms")]
    #[diagnostic(
        code(cyberq::busy),
        help("Another request held the device. Try again in a few seconds.")
    )]
    Busy { waited_ms: u64 },

    #[error("{field} is read-only")]
    #[diagnostic(
        code(cyberq::read_only),
        help("Run: cyberq entities --all to see which fields accept writes.")
    )]
    ReadOnly { field: String },

    #[error("Unknown field '{name}'")]
    #[diagnostic(
        code(cyberq::unknown_field),
        help("Use a device key such as COOK_SET, FOOD1_SET, ALARMDEV or KEY_BEEPS.")
    )]
    UnknownField { name: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cyberq::validation))]
    Validation { field: String, reason: String },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Device is already configured as profile '{profile}'")]
    #[diagnostic(
        code(cyberq::already_configured),
        help("Remove it first with: cyberq config remove {profile}")
    )]
    AlreadyConfigured { profile: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cyberq::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: cyberq config add <name> <host>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(cyberq::no_config),
        help(
            "Pass --host, or create a profile with: cyberq config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(cyberq::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(cyberq::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("Coordinator stopped before the request completed")]
    #[diagnostic(code(cyberq::stopped))]
    Stopped,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(cyberq::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } | Self::Busy { .. } | Self::AlreadyConfigured { .. } => {
                exit_code::CONFLICT
            }
            Self::ReadOnly { .. } => exit_code::PERMISSION,
            Self::UnknownField { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<TransportError> for CliError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::TimedOut { url, timeout_ms } => Self::Timeout {
                target: url,
                millis: timeout_ms,
            },
            TransportError::ConnectionRefused { url, reason } => Self::ConnectionFailed {
                target: url,
                reason,
            },
            TransportError::Rejected {
                key,
                requested,
                echoed,
            } => Self::Rejected {
                field: key,
                requested,
                echoed,
            },
            TransportError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            TransportError::Client(reason) => Self::ConnectionFailed {
                target: "device".into(),
                reason,
            },
            other @ (TransportError::HttpStatus { .. }
            | TransportError::MalformedResponse { .. }) => Self::UnexpectedResponse {
                message: other.to_string(),
            },
        }
    }
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        Self::UnexpectedResponse {
            message: err.to_string(),
        }
    }
}

impl From<WriteError> for CliError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::InvalidValue { field, reason } => Self::Validation {
                field: field.to_string(),
                reason,
            },
            WriteError::ReadOnly(field) => Self::ReadOnly {
                field: field.to_string(),
            },
            WriteError::Rejected {
                field,
                requested,
                echoed,
            } => Self::Rejected {
                field: field.to_string(),
                requested,
                echoed,
            },
            WriteError::Busy { waited_ms } => Self::Busy { waited_ms },
            WriteError::Transport(e) => e.into(),
            WriteError::Stopped => Self::Stopped,
        }
    }
}

impl From<SetupError> for CliError {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::CannotConnect(e) => e.into(),
            SetupError::Unknown(message) => Self::UnexpectedResponse { message },
            SetupError::AlreadyConfigured(profile) => Self::AlreadyConfigured { profile },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(e) => e.into(),
            CoreError::Parse(e) => e.into(),
            CoreError::Write(e) => e.into(),
            CoreError::Setup(e) => e.into(),
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Stopped => Self::Stopped,
            CoreError::Internal(message) => Self::Render(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoProfile => Self::NoConfig {
                path: cyberq_config::config_path().display().to_string(),
            },
            other => Self::Config(other),
        }
    }
}
