//! Dispatch errors — every way a single invocation can fail.
//!
//! All variants are terminal for the current invocation and none is retried
//! automatically. The host surfaces `(kind, detail)` to the user.

use std::fmt;
use std::time::Duration;

use crate::types::{Completion, Provider};

/// Classification of a failed invocation, without the detail payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    InvalidModel,
    MissingCredential,
    TransportFailure,
    Unreachable,
    Timeout,
    MalformedResponse,
    DeliveryFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::InvalidModel => "InvalidModel",
            ErrorKind::MissingCredential => "MissingCredential",
            ErrorKind::TransportFailure => "TransportFailure",
            ErrorKind::Unreachable => "Unreachable",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::MalformedResponse => "MalformedResponse",
            ErrorKind::DeliveryFailure => "DeliveryFailure",
        };
        f.write_str(s)
    }
}

/// A failed dispatch or delivery. `Display` is the human-readable detail.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("nothing to send: the input text is empty")]
    EmptyInput,

    #[error("model '{model}' is not available for {provider}")]
    InvalidModel { provider: Provider, model: String },

    #[error("no API key configured for {0}")]
    MissingCredential(Provider),

    #[error("{provider} returned HTTP {status}: {snippet}")]
    TransportFailure {
        provider: Provider,
        status: u16,
        snippet: String,
    },

    #[error("could not reach {provider}: {reason}")]
    Unreachable { provider: Provider, reason: String },

    #[error("{provider} did not answer within {}s", .after.as_secs())]
    Timeout { provider: Provider, after: Duration },

    #[error("unexpected response from {provider}: {reason}")]
    MalformedResponse { provider: Provider, reason: String },

    #[error("could not deliver the result: {0}")]
    DeliveryFailure(String),
}

impl DispatchError {
    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::EmptyInput => ErrorKind::EmptyInput,
            DispatchError::InvalidModel { .. } => ErrorKind::InvalidModel,
            DispatchError::MissingCredential(_) => ErrorKind::MissingCredential,
            DispatchError::TransportFailure { .. } => ErrorKind::TransportFailure,
            DispatchError::Unreachable { .. } => ErrorKind::Unreachable,
            DispatchError::Timeout { .. } => ErrorKind::Timeout,
            DispatchError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            DispatchError::DeliveryFailure(_) => ErrorKind::DeliveryFailure,
        }
    }

    /// Human-readable detail string for the user-facing error surface.
    pub fn detail(&self) -> String {
        self.to_string()
    }

    /// HTTP status for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::TransportFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of one dispatch: exactly one of a completion or an error.
pub type ChatResult = Result<Completion, DispatchError>;
