use std::io;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value the engines refuse to start with.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid network range {input:?}: {reason}")]
    InvalidRange { input: String, reason: String },

    /// A wait longer than the cancellation signal can represent.
    #[error("wait of {0:?} exceeds the longest supported timeout")]
    DelayOverflow(Duration),

    /// An I/O failure on the shared socket that stopped a worker.
    #[error("{worker}: {source}")]
    Transport {
        worker: &'static str,
        #[source]
        source: io::Error,
    },

    /// The raw socket could not be opened, configured or bound.
    #[error("{context}: {source}")]
    Startup {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("manufacturer database: {0}")]
    Manufacturers(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Name of the worker that failed, for errors that stopped one.
    pub fn worker(&self) -> Option<&'static str> {
        match self {
            Error::Transport { worker, .. } => Some(*worker),
            _ => None,
        }
    }
}
