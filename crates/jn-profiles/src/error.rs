use std::fmt;
use std::path::PathBuf;

/// Result type for jn-profiles operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the profiles layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// No profile file across any tier for the reference
    NotFound { namespace: String, name: String },

    /// A located profile or _meta.json failed to parse
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A located document is not a JSON mapping
    NotAnObject { path: PathBuf },

    /// A field the profile type requires is absent
    MissingField {
        path: PathBuf,
        field: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::NotFound { namespace, name } => {
                write!(f, "Profile not found: @{}/{}", namespace, name)
            }
            Error::Malformed { path, source } => {
                write!(f, "Malformed profile {}: {}", path.display(), source)
            }
            Error::NotAnObject { path } => {
                write!(f, "Profile {} is not a JSON object", path.display())
            }
            Error::MissingField { path, field } => {
                write!(f, "Profile {} is missing required field '{}'", path.display(), field)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Malformed { source, .. } => Some(source),
            Error::NotFound { .. } | Error::NotAnObject { .. } | Error::MissingField { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
