//! Error types surfaced by the client, the run form and exports.

use crate::form::Field;

/// Failure of a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("{path} returned an unexpected body: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// True when the request never got an answer in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            ApiError::Transport { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Rejected run-form input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} is empty")]
    Empty { field: Field },

    #[error("{field} must be a whole number, got {value:?}")]
    InvalidInteger { field: Field, value: String },

    #[error("{field} must be a finite number, got {value:?}")]
    InvalidNumber { field: Field, value: String },
}

impl FormError {
    pub fn field(&self) -> Field {
        match self {
            FormError::Empty { field }
            | FormError::InvalidInteger { field, .. }
            | FormError::InvalidNumber { field, .. } => *field,
        }
    }
}

/// Failure writing a results snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}
