pub mod pattern;
pub mod script_meta;

mod discovery;
mod error;
mod registry;

pub use discovery::{
    DEFAULT_TIMEOUT_MS, DiscoveryOptions, META_FLAG, META_OUTPUT_CAP, PluginDir, discover,
};
pub use error::{Error, Result};
pub use registry::{Match, Registry};
