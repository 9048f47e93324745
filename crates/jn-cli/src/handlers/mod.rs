pub mod cache;
pub mod cat;
pub mod plugin;
pub mod profile;
