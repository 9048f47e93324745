use crate::script_meta;
use jn_types::{Language, Mode, PluginInfo, Role, Tier, mtime_secs};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Flag a native plugin answers with its metadata JSON
pub const META_FLAG: &str = "--jn-meta";

/// Default per-plugin probe timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Metadata output beyond this size is treated as malformed
pub const META_OUTPUT_CAP: usize = 64 * 1024;

/// Script sources beyond this size are not scanned for inline metadata
const SCRIPT_SOURCE_CAP: u64 = 256 * 1024;

/// A directory to scan for plugins of one language at one tier
#[derive(Debug, Clone)]
pub struct PluginDir {
    pub root: PathBuf,
    pub tier: Tier,
    pub language: Language,
}

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub timeout_ms: u64,
    pub meta_output_cap: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            meta_output_cap: META_OUTPUT_CAP,
        }
    }
}

/// The fields a plugin reports about itself, with contract defaults
#[derive(Debug, Deserialize)]
struct MetaPayload {
    name: String,
    matches: Vec<String>,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    role: Role,
    #[serde(default = "default_modes")]
    modes: Vec<Mode>,
    #[serde(default)]
    profile_type: Option<String>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_modes() -> Vec<Mode> {
    vec![Mode::Read, Mode::Write]
}

/// Scan every plugin directory and probe each candidate.
///
/// Per-entry failures (missing binary, non-zero exit, timeout, malformed
/// JSON, oversized output) skip that entry; discovery itself never fails.
/// Entries are visited in directory order, sorted by file name, so
/// first-seen tie-breaking downstream is deterministic.
pub fn discover(dirs: &[PluginDir], opts: &DiscoveryOptions) -> Vec<PluginInfo> {
    let mut plugins = Vec::new();
    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(&dir.root) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if let Some(plugin) = discover_entry(&path, dir, opts) {
                plugins.push(plugin);
            }
        }
    }
    plugins
}

fn discover_entry(path: &Path, dir: &PluginDir, opts: &DiscoveryOptions) -> Option<PluginInfo> {
    match dir.language {
        Language::Native => {
            let exe = resolve_executable(path)?;
            let payload = probe_native(&exe, opts)?;
            build_info(payload, exe, dir)
        }
        Language::Script => {
            if !path.is_file() {
                return None;
            }
            let source = read_script_source(path)?;
            let value = script_meta::parse(&source).ok().flatten()?;
            let payload: MetaPayload = serde_json::from_value(value).ok()?;
            build_info(payload, path.to_path_buf(), dir)
        }
    }
}

fn build_info(payload: MetaPayload, exe: PathBuf, dir: &PluginDir) -> Option<PluginInfo> {
    if payload.name.is_empty() || payload.matches.is_empty() || payload.modes.is_empty() {
        return None;
    }
    let mtime = mtime_secs(&exe).ok()?;
    Some(PluginInfo {
        name: payload.name,
        version: payload.version,
        matches: payload.matches,
        role: payload.role,
        modes: payload.modes,
        profile_type: payload.profile_type,
        language: dir.language,
        tier: dir.tier,
        path: exe,
        mtime,
    })
}

/// A candidate is either an executable file or a directory holding
/// `bin/<dir-name>`
fn resolve_executable(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        let name = path.file_name()?;
        let nested = path.join("bin").join(name);
        if nested.is_file() && is_executable(&nested) {
            return Some(nested);
        }
        return None;
    }
    if path.is_file() && is_executable(path) {
        return Some(path.to_path_buf());
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

/// Run `<plugin> --jn-meta` with a bounded timeout and output cap
fn probe_native(path: &Path, opts: &DiscoveryOptions) -> Option<MetaPayload> {
    let mut child = Command::new(path)
        .arg(META_FLAG)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let cap = opts.meta_output_cap;

    // Drain stdout on a separate thread so a chatty child cannot deadlock
    // against a full pipe while we poll for exit. Only cap+1 bytes are
    // retained; the rest is discarded.
    let reader = std::thread::spawn(move || {
        let mut retained = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            match stdout.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if retained.len() <= cap {
                        let keep = n.min(cap + 1 - retained.len());
                        retained.extend_from_slice(&chunk[..keep]);
                    }
                }
            }
        }
        retained
    });

    let deadline = Instant::now() + Duration::from_millis(opts.timeout_ms);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return None;
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(10)),
            Err(_) => {
                let _ = child.kill();
                let _ = reader.join();
                return None;
            }
        }
    };

    let output = reader.join().ok()?;
    if !status.success() || output.len() > cap {
        return None;
    }
    serde_json::from_slice(&output).ok()
}

fn read_script_source(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > SCRIPT_SOURCE_CAP {
        return None;
    }
    std::fs::read_to_string(path).ok()
}
