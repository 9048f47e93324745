//! Testing infrastructure for jn integration tests.
//!
//! `TestWorld` builds an isolated install/user/project directory layout in
//! a temp dir, populates it with fake plugins and profiles, and produces
//! pre-configured commands whose environment points only at that layout.

pub mod fixtures;
pub mod world;

pub use world::TestWorld;
