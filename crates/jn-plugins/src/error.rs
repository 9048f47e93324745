use std::fmt;

/// Result type for jn-plugins operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the plugins layer
#[derive(Debug)]
pub enum Error {
    /// Inline script metadata block has markers out of order or is unterminated
    MalformedBlock(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedBlock(msg) => write!(f, "Malformed metadata block: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
