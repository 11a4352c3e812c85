use ledash_client::{ClientError, ErrorKind};
use ledash_core::{ColorParseError, EntryError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("invalid entry: {0}")]
    Entry(#[from] EntryError),

    #[error("invalid color: {0}")]
    Color(#[from] ColorParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    /// `2` for bad input, `3` when the panel refused or could not be reached,
    /// `1` otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Entry(_) | Self::Color(_) | Self::InvalidArgument { .. } => 2,
            Self::Client(error) => match error.kind() {
                ErrorKind::Precondition => 2,
                ErrorKind::Transport
                | ErrorKind::Validation
                | ErrorKind::NotFoundOrOutOfRange => 3,
            },
            Self::Json(_) | Self::Io(_) => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
