// ── Core error types ──
//
// Polling failures never leave the coordinator; they become availability
// transitions. Everything here surfaces either from a write, from setup,
// or from a parse that a caller asked for directly.

use thiserror::Error;

use crate::field::Field;

/// Transport-layer failure, re-exported from `cyberq-api`.
pub use cyberq_api::Error as TransportError;

/// A payload could not be turned into a [`Snapshot`](crate::Snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Device did not report {0}")]
    MissingField(&'static str),

    #[error("{field}={value} is outside the device range")]
    OutOfRange { field: &'static str, value: String },

    #[error("{field}={value} is not a known option")]
    UnknownEnum { field: &'static str, value: String },

    #[error("{field}={value} could not be decoded")]
    Malformed { field: &'static str, value: String },
}

impl ParseError {
    /// Wire key of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field)
            | Self::OutOfRange { field, .. }
            | Self::UnknownEnum { field, .. }
            | Self::Malformed { field, .. } => field,
        }
    }
}

/// A write did not reach, or was not accepted by, the device.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: Field, reason: String },

    #[error("{0} is read-only")]
    ReadOnly(Field),

    #[error("Device rejected {field}: requested {requested}, device reports {echoed}")]
    Rejected {
        field: Field,
        requested: String,
        echoed: String,
    },

    #[error("Device busy: could not acquire the device lock within {waited_ms}ms")]
    Busy { waited_ms: u64 },

    #[error("Write failed: {0}")]
    Transport(#[source] TransportError),

    #[error("Coordinator has been stopped")]
    Stopped,
}

impl WriteError {
    pub(crate) fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_transport(field: Field, err: TransportError) -> Self {
        match err {
            TransportError::Rejected {
                requested, echoed, ..
            } => Self::Rejected {
                field,
                requested,
                echoed,
            },
            other => Self::Transport(other),
        }
    }
}

/// Outcome of the setup connectivity probe.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Cannot connect to the device: {0}")]
    CannotConnect(#[source] TransportError),

    #[error("Unexpected response from the device: {0}")]
    Unknown(String),

    #[error("Device {0} is already configured")]
    AlreadyConfigured(String),
}

impl SetupError {
    /// Stable key for the outcome (`cannot_connect`, `unknown`, `already_configured`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::CannotConnect(_) => "cannot_connect",
            Self::Unknown(_) => "unknown",
            Self::AlreadyConfigured(_) => "already_configured",
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Coordinator has been stopped")]
    Stopped,

    #[error("Internal error: {0}")]
    Internal(String),
}
