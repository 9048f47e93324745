mod error;
mod merge;
mod service;
mod subst;

pub use error::{Error, Result};
pub use merge::deep_merge;
pub use service::{LoadedProfile, ProfileEntry, ProfileRoot, ProfileService, ProfileType};
pub use subst::{substitute_env, substitute_str};
