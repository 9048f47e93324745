use std::fmt;
use std::path::PathBuf;

/// Result type for jn-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Profile layer error
    Profile(jn_profiles::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// No plugin claims the address in the requested mode
    NoPluginForAddress { address: String },

    /// The address names a compression with no installed decompressor
    UnsupportedCompression { tag: &'static str, address: String },

    /// The address names a protocol no plugin handles
    UnsupportedProtocol { protocol: String, address: String },

    /// An HTTP header value carries CR or LF
    UnsafeHeader { header: String },

    /// A glob or file-profile pattern expanded to nothing
    NoFilesMatch { pattern: String },

    /// The addressed file does not exist
    FileNotFound { path: PathBuf },

    /// A glob pattern is not syntactically valid
    InvalidGlob { pattern: String, detail: String },

    /// A pipeline stage failed to start
    SpawnFailed {
        program: PathBuf,
        source: std::io::Error,
    },

    /// The address parsed but lacks the parts this operation needs
    InvalidAddress { address: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Profile(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::NoPluginForAddress { address } => {
                write!(
                    f,
                    "No plugin matches '{}' (use `~format` to name one explicitly)",
                    address
                )
            }
            Error::UnsupportedCompression { tag, address } => {
                write!(f, "No decompressor installed for {} ('{}')", tag, address)
            }
            Error::UnsupportedProtocol { protocol, address } => {
                write!(f, "No plugin handles {}:// ('{}')", protocol, address)
            }
            Error::UnsafeHeader { header } => {
                write!(f, "Header value contains CR or LF: {:?}", header)
            }
            Error::NoFilesMatch { pattern } => {
                write!(f, "No files match '{}'", pattern)
            }
            Error::FileNotFound { path } => {
                write!(f, "No such file: {}", path.display())
            }
            Error::InvalidGlob { pattern, detail } => {
                write!(f, "Invalid glob '{}': {}", pattern, detail)
            }
            Error::SpawnFailed { program, source } => {
                write!(f, "Failed to start {}: {}", program.display(), source)
            }
            Error::InvalidAddress { address } => {
                write!(f, "Address '{}' is missing required parts", address)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Profile(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::SpawnFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<jn_profiles::Error> for Error {
    fn from(err: jn_profiles::Error) -> Self {
        Error::Profile(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
