use crate::error::{Error, Result};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Expand a glob pattern to matching files, sorted for deterministic
/// pipeline order. Zero matches yield an empty list (nullglob), never an
/// error; the caller decides whether that is acceptable.
///
/// `**` patterns walk the fixed base directory recursively and match the
/// final filename component only. Plain patterns expand with ordinary
/// shell semantics.
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = if pattern.contains("**") {
        expand_recursive(pattern)?
    } else {
        expand_simple(pattern)?
    };
    files.sort();
    Ok(files)
}

/// Walk the directory prefix before `**`, matching file names against the
/// pattern's final component
fn expand_recursive(pattern: &str) -> Result<Vec<PathBuf>> {
    let star_idx = pattern.find("**").unwrap_or(0);
    let base = match pattern[..star_idx].rfind('/') {
        Some(slash) => &pattern[..slash],
        None => ".",
    };
    let file_pattern = match pattern.rfind('/') {
        Some(slash) => &pattern[slash + 1..],
        None => pattern,
    };
    let matcher = glob::Pattern::new(file_pattern).map_err(|err| Error::InvalidGlob {
        pattern: pattern.to_string(),
        detail: err.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(base).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.matches(&entry.file_name().to_string_lossy()) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

fn expand_simple(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| Error::InvalidGlob {
        pattern: pattern.to_string(),
        detail: err.to_string(),
    })?;
    Ok(paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect())
}
