use std::fmt;

/// Result type for jn-cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the cache layer.
///
/// Callers treat every variant as a cache miss; none are fatal.
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Cache file is not valid JSON
    Json(serde_json::Error),

    /// Envelope schema version does not match this build
    VersionMismatch { found: u32, expected: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::VersionMismatch { found, expected } => {
                write!(f, "Cache version {} does not match {}", found, expected)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::VersionMismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
