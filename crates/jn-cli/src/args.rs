use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jn")]
#[command(about = "Stream NDJSON between formats, files, URLs, and profiles", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Installation root (defaults to JN_ROOT, then the platform data dir)
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Project root (defaults to JN_PROJECT_DIR, then the nearest ancestor
    /// holding a .jn directory)
    #[arg(long, global = true)]
    pub project_root: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read an address and stream NDJSON to stdout
    Cat(CatArgs),

    /// Inspect and refresh the plugin catalog
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },

    /// Manage the plugin discovery cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// List and inspect profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Args)]
pub struct CatArgs {
    /// File path, URL, glob, @namespace/name profile, or `-` for stdin
    pub address: String,

    /// Field delimiter, forwarded to the format plugin
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Tell the format plugin the input has no header row
    #[arg(long)]
    pub no_header: bool,

    /// Extra HTTP header for URL fetches (repeatable)
    #[arg(long = "header", short = 'H', value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Prepend _path/_file_index metadata to records from multi-file reads
    #[arg(long, visible_alias = "inject-meta")]
    pub meta: bool,

    /// Fail when a glob expands to no files
    #[arg(long)]
    pub require_match: bool,

    /// Per-plugin metadata probe timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Rescan plugins instead of trusting the cache
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Subcommand)]
pub enum PluginCommand {
    /// List installed plugins, or those matching an address by score
    List {
        /// Show only plugins matching this address
        #[arg(long)]
        address: Option<String>,

        /// Mode the plugins must support
        #[arg(long, default_value = "read")]
        mode: String,
    },

    /// Rediscover plugins and rewrite the cache
    Scan,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Delete the plugin cache; the next run rediscovers
    Clear,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// List profiles across all tiers
    List {
        /// Restrict to one profile type (http, duckdb, file)
        #[arg(long = "type", value_name = "TYPE")]
        profile_type: Option<String>,
    },

    /// Print a profile's merged document
    Show {
        /// Profile reference, e.g. @api/users
        reference: String,
    },
}
