mod address;
mod plugin;
mod util;

pub use address::{Address, AddressKind, Compression};
pub use plugin::{Language, Mode, PluginInfo, Role, Tier};
pub use util::*;
