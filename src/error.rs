use thiserror::Error;

/// Crate-wide error type. Everything fallible returns [`Result`].
#[derive(Debug, Error)]
pub enum TraceError {
    /// The OBJ text could not be parsed into records.
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// Parsed records describe an inconsistent mesh (degenerate face,
    /// index out of range, ...). Loading stops, no partial mesh is returned.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A bad command line argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The terminal reported an unusable size; rendering into a zero-sized
    /// canvas is never allowed.
    #[error("invalid canvas size {rows}x{cols}")]
    InvalidCanvas { rows: u16, cols: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;
