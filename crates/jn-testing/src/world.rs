use crate::fixtures;
use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Which tier of the layout a fixture lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldTier {
    Project,
    User,
    Bundled,
}

/// An isolated jn directory layout: install root, fake home, and a
/// project directory, all inside one temp dir.
///
/// # Example
/// ```no_run
/// use jn_testing::TestWorld;
///
/// let world = TestWorld::new();
/// world.add_native_plugin(jn_testing::world::WorldTier::Bundled, "csv", &[r".*\.csv$"]).unwrap();
/// let output = world.run(&["plugin", "list"]).unwrap();
/// assert!(output.status.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    install_root: PathBuf,
    home: PathBuf,
    project: PathBuf,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let install_root = temp_dir.path().join("install");
        let home = temp_dir.path().join("home");
        let project = temp_dir.path().join("project");

        fs::create_dir_all(&install_root).expect("Failed to create install root");
        fs::create_dir_all(&home).expect("Failed to create home");
        fs::create_dir_all(project.join(".jn")).expect("Failed to create project layout");

        Self {
            temp_dir,
            install_root,
            home,
            project,
        }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn plugins_dir(&self, tier: WorldTier, language: &str) -> PathBuf {
        match tier {
            WorldTier::Project => self.project.join(".jn/plugins").join(language),
            WorldTier::User => self.home.join(".local/jn/plugins").join(language),
            WorldTier::Bundled => self.install_root.join("plugins").join(language),
        }
    }

    fn profiles_dir(&self, tier: WorldTier) -> PathBuf {
        match tier {
            WorldTier::Project => self.project.join(".jn/profiles"),
            WorldTier::User => self.home.join(".local/jn/profiles"),
            WorldTier::Bundled => self.install_root.join("profiles"),
        }
    }

    /// Install a fake native plugin answering `--jn-meta` with a minimal
    /// payload for the given match patterns
    pub fn add_native_plugin(&self, tier: WorldTier, name: &str, matches: &[&str]) -> Result<PathBuf> {
        self.add_native_plugin_raw(tier, name, &fixtures::meta_json(name, matches))
    }

    /// Install a fake native plugin with an explicit `--jn-meta` payload
    pub fn add_native_plugin_raw(
        &self,
        tier: WorldTier,
        name: &str,
        meta_json: &str,
    ) -> Result<PathBuf> {
        let dir = self.plugins_dir(tier, "native");
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, fixtures::native_plugin_body(meta_json))?;
        make_executable(&path)?;
        Ok(path)
    }

    /// Install a native plugin with a hand-written script body (for tests
    /// that need observable runtime behaviour beyond pass-through)
    pub fn add_native_plugin_with_body(
        &self,
        tier: WorldTier,
        name: &str,
        body: &str,
    ) -> Result<PathBuf> {
        let dir = self.plugins_dir(tier, "native");
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, body)?;
        make_executable(&path)?;
        Ok(path)
    }

    /// Install a script plugin carrying inline metadata
    pub fn add_script_plugin(
        &self,
        tier: WorldTier,
        file_name: &str,
        source: &str,
    ) -> Result<PathBuf> {
        let dir = self.plugins_dir(tier, "script");
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, source)?;
        Ok(path)
    }

    /// Write a profile document at `<tier>/profiles/<relative>`
    pub fn add_profile(&self, tier: WorldTier, relative: &str, body: &str) -> Result<PathBuf> {
        let path = self.profiles_dir(tier).join(relative);
        fs::create_dir_all(path.parent().expect("profile path has a parent"))?;
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Write a data file inside the project directory
    pub fn add_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.project.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// A `jn` command pinned to this world's layout: JN_ROOT at the
    /// install root, HOME at the fake home, JN_PROJECT_DIR and working
    /// directory at the project
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("jn").expect("jn binary should be built");
        cmd.env("JN_ROOT", &self.install_root)
            .env("HOME", &self.home)
            .env("JN_PROJECT_DIR", &self.project)
            .current_dir(&self.project);
        cmd
    }

    /// Run `jn` with the given arguments and collect its output
    pub fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = self.command();
        Ok(cmd.args(args).output()?)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
