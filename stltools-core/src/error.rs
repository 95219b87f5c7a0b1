/// Error types for STL conversion
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The ASCII input does not exist or cannot be read as a file.
    #[error("input file not found or unreadable: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Read fault while scanning the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Write fault on an output stream with no known path.
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),

    /// The destination could not be created, written or moved into place.
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output path was to be derived but the input has no `.stl` suffix.
    #[error("wrong input file format: {}", path.display())]
    FormatMismatch { path: PathBuf },

    #[error("{count} triangles do not fit the binary STL count field")]
    TooManyTriangles { count: u64 },

    /// A binary STL is shorter than its header and triangle count.
    #[error("invalid binary STL header: expected {expected} bytes, got {got}")]
    InvalidHeader { expected: usize, got: usize },

    /// A binary STL ended before all declared triangles were read.
    #[error("binary STL truncated: expected {expected} triangles, got {got}")]
    Truncated { expected: u32, got: u32 },
}

impl Error {
    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Attach the destination path to a stream-level write fault.
    pub(crate) fn at_output(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Write(source) => Self::output(path, source),
            other => other,
        }
    }

    /// Map a failed `File::open` on the input. Missing and unreadable inputs
    /// are both reported as not found.
    pub(crate) fn open_input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                Self::InputNotFound { path: path.into() }
            }
            _ => Self::Io(source),
        }
    }
}
