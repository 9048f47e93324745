// NOTE: Runtime Architecture Rationale
//
// Why cache-then-discover (not discover every run)?
// - Probing every native plugin costs one process spawn each
// - mtime snapshots make staleness detection a handful of stat calls
// - Any cache problem degrades to a rescan, never to a failure
//
// Why direct spawn (not a shell command string)?
// - Pipes are wired explicitly, so no argument escaping obligation exists
// - Glob expansion happens in-process before any argv is built
// - The one external tool invoked by name is the URL fetcher (curl)

pub mod catalog;
pub mod config;
pub mod globbing;
pub mod pipeline;
pub mod resolver;

mod error;

pub use config::{Config, PROJECT_ENV, Paths, ROOT_ENV};
pub use error::{Error, Result};
pub use pipeline::{PipelineInput, PipelineSpec, PipelineStage, run, run_all};
pub use resolver::{DEFAULT_FORMAT, ResolveOptions, Resolver};
