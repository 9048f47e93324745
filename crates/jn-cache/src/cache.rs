use crate::error::{Error, Result};
use jn_types::{PluginInfo, mtime_secs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bumped whenever the plugin record shape changes; a mismatch on load is
/// treated as a cache miss.
pub const CACHE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    plugins: Vec<PluginInfo>,
}

/// Persisted plugin discovery results.
///
/// Freshness is mtime-only: a plugin whose file was renamed to a path with
/// an identical mtime would read as fresh. Content hashes would close that
/// gap at the cost of hashing every plugin on every run.
pub struct PluginCache {
    path: PathBuf,
}

impl PluginCache {
    pub fn new(install_root: &Path) -> Self {
        Self {
            path: install_root.join("cache").join("plugins.json"),
        }
    }

    /// Use an explicit cache file location
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialise the catalog, write to a sibling temp file, then rename
    /// into place. The temp file is removed on any failure.
    pub fn store(&self, plugins: &[PluginInfo]) -> Result<()> {
        let envelope = Envelope {
            version: CACHE_VERSION,
            plugins: plugins.to_vec(),
        };
        let body = serde_json::to_vec_pretty(&envelope)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        if let Err(err) = std::fs::write(&tmp, &body) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        if let Err(err) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }

    /// Read the cache back without checking freshness
    pub fn load(&self) -> Result<Vec<PluginInfo>> {
        let body = std::fs::read(&self.path)?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        if envelope.version != CACHE_VERSION {
            return Err(Error::VersionMismatch {
                found: envelope.version,
                expected: CACHE_VERSION,
            });
        }
        Ok(envelope.plugins)
    }

    /// All-or-nothing freshness: every recorded plugin file must still
    /// exist with its recorded mtime
    pub fn is_valid(plugins: &[PluginInfo]) -> bool {
        plugins
            .iter()
            .all(|p| mtime_secs(&p.path).is_ok_and(|m| m == p.mtime))
    }

    /// Load and validate in one step; any failure is a miss
    pub fn load_valid(&self) -> Option<Vec<PluginInfo>> {
        let plugins = self.load().ok()?;
        Self::is_valid(&plugins).then_some(plugins)
    }

    /// Delete the cache file; errors are ignored
    pub fn invalidate(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
