use std::path::PathBuf;

use thiserror::Error;

use crate::config::credentials::CREDENTIAL_PREFIX;

/// Credential text rejected at capture time. Never touches storage or network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid API key: it must start with \"{}\"", CREDENTIAL_PREFIX)]
pub struct ValidationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store file {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("could not persist API key: {0}")]
    Storage(#[from] StorageError),
}

/// Failure of one call to the remote endpoint.
///
/// `Api` and `Status` come from a response the server actually sent;
/// `Transport` and `Decode` carry no structured body and are only
/// described by their message text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// Non-success status with a structured `{ "error": { .. } }` body.
    #[error("API error {status} ({kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    /// Non-success status whose body is not a structured error.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    /// Success status but the reply could not be read.
    #[error("malformed reply: {0}")]
    Decode(String),
}

/// Why a message submission was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("message is empty")]
    EmptyDraft,

    #[error("a request is already in flight")]
    InFlight,

    #[error("an API key is required before chatting")]
    CaptureActive,
}
