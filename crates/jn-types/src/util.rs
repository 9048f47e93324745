use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Modification time of a file as whole seconds since the Unix epoch
pub fn mtime_secs(path: &Path) -> std::io::Result<u64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

/// Walk up from `start` looking for a directory that contains `.jn/`.
///
/// Returns the first ancestor (including `start` itself) holding a `.jn`
/// directory, or `None` when the chain is exhausted.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".jn").is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
