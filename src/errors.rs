use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for reading and writing filing artifacts.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed filing at {}:{line}: {source}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }
}
