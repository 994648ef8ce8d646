use thiserror::Error;

/// Broad failure classes surfaced to the user.
///
/// `InvalidParameters` is reported next to the offending field, the other two
/// as a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidParameters,
    Io,
    Computation,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid {field}: {reason}")]
    InvalidParameters { field: &'static str, reason: String },

    #[error("Edge list line {line}: {reason}")]
    EdgeListParse { line: usize, reason: String },

    #[error("A background task is already running")]
    AlreadyRunning,

    #[error("No network loaded")]
    NoNetwork,

    #[error("No home directory")]
    NoHomeDir,

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("Worker panicked: {0}")]
    WorkerPanic(String),
}

impl Error {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameters {
            field,
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidParameters { .. } | Error::AlreadyRunning | Error::NoNetwork => {
                ErrorCategory::InvalidParameters
            }
            Error::Io(_)
            | Error::EdgeListParse { .. }
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::NoHomeDir => ErrorCategory::Io,
            Error::Computation(_) | Error::WorkerPanic(_) => ErrorCategory::Computation,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
