use std::path::PathBuf;

use ledash_core::EntryError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Coarse classification used by callers that only need to know how an
/// operation failed, not where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-success status or the request never completed.
    Transport,
    /// A response arrived but did not have the expected shape.
    Validation,
    /// The addressed entry or panel does not exist.
    NotFoundOrOutOfRange,
    /// The caller asked for something the local view says cannot happen.
    Precondition,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{method} {path} failed with status {status}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },

    #[error("{method} {path} did not complete: {source}")]
    Network {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response to {operation} has an unexpected shape: {source}")]
    Validation {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("entry {index} is out of range for {count} entries")]
    OutOfRange { index: usize, count: usize },

    #[error("panel not found: {panel_id}")]
    PanelNotFound { panel_id: String },

    #[error("{action} refused: {reason}")]
    Refused {
        action: &'static str,
        reason: String,
    },

    #[error("invalid entry: {0}")]
    Entry(#[from] EntryError),

    #[error("failed to build HTTP client: {0}")]
    Setup(#[source] reqwest::Error),

    #[error("failed to start {name} thread: {source}")]
    Thread {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {path} is not valid JSON: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Status { status, .. } if matches!(status, 404 | 416 | 422) => {
                ErrorKind::NotFoundOrOutOfRange
            }
            Self::Status { .. } | Self::Network { .. } | Self::Setup(_) | Self::Thread { .. } => {
                ErrorKind::Transport
            }
            Self::Validation { .. } => ErrorKind::Validation,
            Self::OutOfRange { .. } | Self::PanelNotFound { .. } => {
                ErrorKind::NotFoundOrOutOfRange
            }
            Self::Refused { .. }
            | Self::Entry(_)
            | Self::Config { .. }
            | Self::ConfigIo { .. }
            | Self::ConfigParse { .. } => ErrorKind::Precondition,
        }
    }

    #[must_use]
    pub fn refused(action: &'static str, reason: impl Into<String>) -> Self {
        Self::Refused {
            action,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
