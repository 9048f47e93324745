use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a plugin was found. Higher tiers shadow lower ones at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Project,
    User,
    Bundled,
}

impl Tier {
    /// Base score contributed to plugin matching
    pub fn score(self) -> u32 {
        match self {
            Tier::Project => 300,
            Tier::User => 200,
            Tier::Bundled => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Project => "project",
            Tier::User => "user",
            Tier::Bundled => "bundled",
        }
    }
}

/// How a plugin is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Compiled binary, probed with --jn-meta
    Native,
    /// Source file with inline metadata, run through its interpreter
    Script,
}

impl Language {
    pub fn score(self) -> u32 {
        match self {
            Language::Native => 10,
            Language::Script => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Native => "native",
            Language::Script => "script",
        }
    }
}

/// Operation a plugin can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Read,
    Write,
    Raw,
    Profiles,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Read => "read",
            Mode::Write => "write",
            Mode::Raw => "raw",
            Mode::Profiles => "profiles",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Mode::Read),
            "write" => Some(Mode::Write),
            "raw" => Some(Mode::Raw),
            "profiles" => Some(Mode::Profiles),
            _ => None,
        }
    }
}

/// What kind of work a plugin does in a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Format,
    Protocol,
    Compression,
    Database,
}

impl Default for Role {
    fn default() -> Self {
        Role::Format
    }
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Format => "format",
            Role::Protocol => "protocol",
            Role::Compression => "compression",
            Role::Database => "database",
        }
    }
}

/// A discovered plugin executable.
///
/// Built by discovery from a `--jn-meta` probe or an inline script header,
/// held by the registry, and round-tripped through the on-disk cache.
/// `mtime` is the source file's modification time (whole seconds since the
/// Unix epoch) snapshotted at discovery; the cache compares it for equality
/// to decide freshness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub matches: Vec<String>,
    pub role: Role,
    pub modes: Vec<Mode>,
    pub profile_type: Option<String>,
    pub language: Language,
    pub tier: Tier,
    pub path: PathBuf,
    pub mtime: u64,
}

impl PluginInfo {
    pub fn supports(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }
}
