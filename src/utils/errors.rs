use std::{fmt::Debug, io, path::PathBuf};

use thiserror::Error;

pub type EmptyResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type ResultWithError<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Result type of the listing and aggregation pipeline.
pub type StateResult<T> = Result<T, StateInfoError>;

/// How a remote call failed, used to decide whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Unauthorized,
    NotFound,
    Transient,
    Other,
}

#[derive(Debug, Error)]
pub enum StateInfoError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("remote service error ({kind:?}): {message}")]
    RemoteService {
        kind: RemoteErrorKind,
        message: String,
    },

    #[error("download of {url} failed: {message}")]
    Download {
        url: String,
        message: String,
        transient: bool,
    },

    #[error("filesystem error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid page number {0}, pages start at 1")]
    InvalidPage(u32),
}

impl StateInfoError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn remote(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self::RemoteService {
            kind,
            message: message.into(),
        }
    }

    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            Self::RemoteService { kind, .. } => *kind == RemoteErrorKind::Transient,
            Self::Download { transient, .. } => *transient,
            _ => false,
        }
    }
}

pub trait ResultTrait<T, E> {
    fn auto_err(self, desc: &str) -> ResultWithError<T>;
}

impl<T, E> ResultTrait<T, E> for Result<T, E>
where
    E: Debug,
{
    fn auto_err(self, desc: &str) -> ResultWithError<T> {
        match self {
            Ok(t) => Ok(t),
            Err(e) => Err(format!("{desc}: {e:?}").into()),
        }
    }
}
