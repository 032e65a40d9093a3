//! Error types for dynax-extract.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("timed out waiting for {url}")]
    NetworkTimeout { url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("gzip decompression failed: {0}")]
    Decompression(String),

    #[error("malformed archive: {0}")]
    ArchiveParse(String),

    #[error("failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive entry '{entry}' escapes the destination directory")]
    UnsafeEntryPath { entry: PathBuf },

    #[error("extraction interrupted: {0}")]
    Interrupted(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify an I/O error surfacing from the blocking parse stage.
    ///
    /// Network and gzip failures travel through the `Read` chain tagged as a
    /// [`StageFault`]; anything untagged was raised by the tar parser itself.
    pub(crate) fn from_parse(err: io::Error) -> Self {
        match StageFault::find(&err) {
            Some(fault) => fault.into(),
            None => Self::ArchiveParse(err.to_string()),
        }
    }
}

/// Failure raised upstream of the tar parser, carried inside `io::Error`.
#[derive(Debug, Clone, Error)]
pub(crate) enum StageFault {
    #[error("timed out waiting for {0}")]
    Timeout(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Decompression(String),
}

impl StageFault {
    pub(crate) fn network(err: &Error) -> Self {
        match err {
            Error::NetworkTimeout { url } => Self::Timeout(url.clone()),
            Error::Network(msg) => Self::Network(msg.clone()),
            other => Self::Network(other.to_string()),
        }
    }

    pub(crate) fn into_io(self) -> io::Error {
        io::Error::other(self)
    }

    /// Search the source chain, looking through custom `io::Error` payloads
    /// that `source()` alone would skip.
    pub(crate) fn find(err: &io::Error) -> Option<Self> {
        let mut current = Some(err as &(dyn StdError + 'static));
        while let Some(e) = current {
            if let Some(fault) = e.downcast_ref::<StageFault>() {
                return Some(fault.clone());
            }
            current = match e.downcast_ref::<io::Error>().and_then(io::Error::get_ref) {
                Some(inner) => Some(inner as &(dyn StdError + 'static)),
                None => e.source(),
            };
        }
        None
    }
}

impl From<StageFault> for Error {
    fn from(fault: StageFault) -> Self {
        match fault {
            StageFault::Timeout(url) => Self::NetworkTimeout { url },
            StageFault::Network(msg) => Self::Network(msg),
            StageFault::Decompression(msg) => Self::Decompression(msg),
        }
    }
}
