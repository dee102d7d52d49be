use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeektarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure tied to a filesystem path, e.g. probing a file while building a segment.
    #[error("{op} {}: {source}", path.display())]
    Path {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failure of an already-constructed piece while a cursor was using it.
    #[error("{op} piece {index}: {source}")]
    Piece {
        op: &'static str,
        index: usize,
        #[source]
        source: io::Error,
    },

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid virtual path: {0}")]
    VirtualPath(String),

    #[error("range start {start} is beyond the end of a {size} byte stream")]
    Range { start: u64, size: u64 },
}

impl SeektarError {
    pub(crate) fn path(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SeektarError::Path {
            op,
            path: path.into(),
            source,
        }
    }

    /// Wrap a piece failure into an `io::Error` that keeps the source kind.
    pub(crate) fn piece_io(op: &'static str, index: usize, source: io::Error) -> io::Error {
        let kind = source.kind();
        io::Error::new(kind, SeektarError::Piece { op, index, source })
    }
}

impl From<SeektarError> for io::Error {
    fn from(e: SeektarError) -> Self {
        let kind = match &e {
            SeektarError::Io(err) => err.kind(),
            SeektarError::Path { source, .. } | SeektarError::Piece { source, .. } => {
                source.kind()
            }
            SeektarError::VirtualPath(_) | SeektarError::Range { .. } => {
                io::ErrorKind::InvalidInput
            }
            SeektarError::Walk(_) => io::ErrorKind::Other,
        };
        match e {
            SeektarError::Io(err) => err,
            other => io::Error::new(kind, other),
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, SeektarError>;
