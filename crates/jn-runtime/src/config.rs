use crate::{Error, Result};
use jn_plugins::{DEFAULT_TIMEOUT_MS, DiscoveryOptions, META_OUTPUT_CAP, PluginDir};
use jn_profiles::ProfileRoot;
use jn_types::{Language, Tier, discover_project_root};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Pins the installation root (bundled plugins, profiles, cache, config)
pub const ROOT_ENV: &str = "JN_ROOT";

/// Pins the project root for nested invocations
pub const PROJECT_ENV: &str = "JN_PROJECT_DIR";

/// Resolve the installation root by priority:
/// 1. Explicit path (with tilde expansion)
/// 2. JN_ROOT environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.jn (fallback for systems without XDG)
pub fn resolve_install_root(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand_tilde(path));
    }
    if let Ok(env_path) = std::env::var(ROOT_ENV) {
        return Ok(expand_tilde(&env_path));
    }
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("jn"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".jn"));
    }
    Err(Error::Config(
        "Could not determine installation root: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// The three tier roots everything else derives from
#[derive(Debug, Clone)]
pub struct Paths {
    pub install_root: PathBuf,
    pub user_root: Option<PathBuf>,
    pub project_root: Option<PathBuf>,
}

impl Paths {
    pub fn resolve(explicit_root: Option<&str>, explicit_project: Option<&str>) -> Result<Self> {
        let install_root = resolve_install_root(explicit_root)?;
        let user_root = dirs::home_dir().map(|home| home.join(".local").join("jn"));

        let project_root = match explicit_project {
            Some(path) => Some(expand_tilde(path)),
            None => match std::env::var(PROJECT_ENV) {
                Ok(env_path) => Some(expand_tilde(&env_path)),
                Err(_) => std::env::current_dir()
                    .ok()
                    .and_then(|cwd| discover_project_root(&cwd)),
            },
        };

        Ok(Self {
            install_root,
            user_root,
            project_root,
        })
    }

    /// Plugin directories in priority order: project, user, bundled, each
    /// with native before script
    pub fn plugin_dirs(&self) -> Vec<PluginDir> {
        let mut dirs = Vec::new();
        let mut push_tier = |root: &Path, tier: Tier| {
            for (language, sub) in [(Language::Native, "native"), (Language::Script, "script")] {
                dirs.push(PluginDir {
                    root: root.join(sub),
                    tier,
                    language,
                });
            }
        };

        if let Some(project) = &self.project_root {
            push_tier(&project.join(".jn").join("plugins"), Tier::Project);
        }
        if let Some(user) = &self.user_root {
            push_tier(&user.join("plugins"), Tier::User);
        }
        push_tier(&self.install_root.join("plugins"), Tier::Bundled);
        dirs
    }

    /// Profile roots in the same priority order
    pub fn profile_roots(&self) -> Vec<ProfileRoot> {
        let mut roots = Vec::new();
        if let Some(project) = &self.project_root {
            roots.push(ProfileRoot {
                root: project.join(".jn").join("profiles"),
                tier: Tier::Project,
            });
        }
        if let Some(user) = &self.user_root {
            roots.push(ProfileRoot {
                root: user.join("profiles"),
                tier: Tier::User,
            });
        }
        roots.push(ProfileRoot {
            root: self.install_root.join("profiles"),
            tier: Tier::Bundled,
        });
        roots
    }

    pub fn config_file(&self) -> PathBuf {
        self.install_root.join("config.toml")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-plugin metadata probe timeout, milliseconds
    pub discovery_timeout_ms: u64,

    /// Metadata output beyond this many bytes is treated as malformed
    pub meta_output_cap: usize,

    /// Additional native plugin directories, scanned at the user tier
    pub extra_plugin_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery_timeout_ms: DEFAULT_TIMEOUT_MS,
            meta_output_cap: META_OUTPUT_CAP,
            extra_plugin_dirs: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(paths: &Paths) -> Result<Self> {
        Self::load_from(&paths.config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            timeout_ms: self.discovery_timeout_ms,
            meta_output_cap: self.meta_output_cap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_defaults_when_file_missing() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(config.discovery_timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.meta_output_cap, META_OUTPUT_CAP);
        assert!(config.extra_plugin_dirs.is_empty());
    }

    #[test]
    fn config_parses_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "discovery_timeout_ms = 250\nextra_plugin_dirs = [\"/opt/more-plugins\"]\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.discovery_timeout_ms, 250);
        assert_eq!(config.extra_plugin_dirs, vec![PathBuf::from("/opt/more-plugins")]);
        // untouched fields keep their defaults
        assert_eq!(config.meta_output_cap, META_OUTPUT_CAP);
    }

    #[test]
    fn config_rejects_bad_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "discovery_timeout_ms = \"soon\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn explicit_root_wins() {
        let paths = Paths::resolve(Some("/opt/jn"), None).unwrap();
        assert_eq!(paths.install_root, PathBuf::from("/opt/jn"));
    }

    #[test]
    fn plugin_dirs_cover_tiers_in_order() {
        let paths = Paths {
            install_root: PathBuf::from("/opt/jn"),
            user_root: Some(PathBuf::from("/home/u/.local/jn")),
            project_root: Some(PathBuf::from("/work/proj")),
        };

        let dirs = paths.plugin_dirs();
        assert_eq!(dirs.len(), 6);
        assert_eq!(dirs[0].tier, Tier::Project);
        assert_eq!(dirs[0].language, Language::Native);
        assert_eq!(dirs[0].root, PathBuf::from("/work/proj/.jn/plugins/native"));
        assert_eq!(dirs[1].language, Language::Script);
        assert_eq!(dirs[2].tier, Tier::User);
        assert_eq!(dirs[5].tier, Tier::Bundled);
        assert_eq!(dirs[5].root, PathBuf::from("/opt/jn/plugins/script"));
    }

    #[test]
    fn missing_project_root_drops_project_tier() {
        let paths = Paths {
            install_root: PathBuf::from("/opt/jn"),
            user_root: None,
            project_root: None,
        };
        let dirs = paths.plugin_dirs();
        assert_eq!(dirs.len(), 2);
        assert!(dirs.iter().all(|d| d.tier == Tier::Bundled));
        assert_eq!(paths.profile_roots().len(), 1);
    }
}
