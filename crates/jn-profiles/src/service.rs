use crate::error::{Error, Result};
use crate::merge::deep_merge;
use crate::subst::substitute_env;
use jn_types::Tier;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Profile categories the core understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Http,
    Duckdb,
    File,
}

impl ProfileType {
    /// Lookup order for a bare `@ns/name` reference with no type hint
    pub const CASCADE: [ProfileType; 3] = [ProfileType::Http, ProfileType::Duckdb, ProfileType::File];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileType::Http => "http",
            ProfileType::Duckdb => "duckdb",
            ProfileType::File => "file",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ProfileType::Http | ProfileType::File => "json",
            ProfileType::Duckdb => "sql",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "http" => Some(ProfileType::Http),
            "duckdb" => Some(ProfileType::Duckdb),
            "file" => Some(ProfileType::File),
            _ => None,
        }
    }
}

/// A profiles directory at one tier, containing per-type subdirectories
#[derive(Debug, Clone)]
pub struct ProfileRoot {
    pub root: PathBuf,
    pub tier: Tier,
}

/// One profile visible after tier shadowing
#[derive(Debug, Clone)]
pub struct ProfileEntry {
    pub profile_type: ProfileType,
    pub namespace: String,
    pub name: String,
    pub tier: Tier,
    pub path: PathBuf,
}

/// A profile with its ancestor defaults merged and substituted
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub profile_type: ProfileType,
    pub tier: Tier,
    pub path: PathBuf,
    pub doc: Value,
    /// SQL text, for duckdb profiles only
    pub sql: Option<String>,
}

const META_FILE: &str = "_meta.json";

/// Locates and loads profiles across tiered roots.
///
/// Roots are consulted in priority order (project, user, bundled); the
/// first tier holding a file wins and shadows the rest.
pub struct ProfileService {
    roots: Vec<ProfileRoot>,
}

impl ProfileService {
    pub fn new(roots: Vec<ProfileRoot>) -> Self {
        Self { roots }
    }

    /// All profiles of one type, shadowed by `<namespace>/<name>` identity
    /// and sorted for stable listings
    pub fn list(&self, profile_type: ProfileType) -> Vec<ProfileEntry> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        for root in &self.roots {
            let type_dir = root.root.join(profile_type.as_str());
            for (namespace, name, path) in scan_type_dir(&type_dir, profile_type) {
                let identity = format!("{}/{}", namespace, name);
                if seen.insert(identity) {
                    entries.push(ProfileEntry {
                        profile_type,
                        namespace,
                        name,
                        tier: root.tier,
                        path,
                    });
                }
            }
        }

        entries.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        entries
    }

    /// Highest-tier file for the reference, if any
    pub fn locate(
        &self,
        profile_type: ProfileType,
        namespace: &str,
        name: &str,
    ) -> Option<(PathBuf, Tier)> {
        let relative = format!(
            "{}/{}/{}.{}",
            profile_type.as_str(),
            namespace,
            name,
            profile_type.extension()
        );
        for root in &self.roots {
            let candidate = root.root.join(&relative);
            if candidate.is_file() {
                return Some((candidate, root.tier));
            }
        }
        None
    }

    /// Resolve a reference with no type hint by cascading http, then
    /// duckdb, then file
    pub fn locate_any(&self, namespace: &str, name: &str) -> Option<(ProfileType, PathBuf, Tier)> {
        for profile_type in ProfileType::CASCADE {
            if let Some((path, tier)) = self.locate(profile_type, namespace, name) {
                return Some((profile_type, path, tier));
            }
        }
        None
    }

    /// Load a profile: collect `_meta.json` ancestors from the namespace
    /// root down to the profile's directory, deep-merge them root-first,
    /// overlay the profile document, then substitute environment
    /// references
    pub fn load(
        &self,
        profile_type: ProfileType,
        namespace: &str,
        name: &str,
        substitute: bool,
    ) -> Result<LoadedProfile> {
        let (path, tier) = self
            .locate(profile_type, namespace, name)
            .ok_or_else(|| Error::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        // the root the winning file came from
        let root = self
            .roots
            .iter()
            .find(|r| path.starts_with(&r.root))
            .map(|r| r.root.clone())
            .unwrap_or_default();

        let mut doc = Value::Object(serde_json::Map::new());
        for meta_path in meta_chain(&root, profile_type, namespace, name) {
            if meta_path.is_file() {
                deep_merge(&mut doc, read_json_object(&meta_path)?);
            }
        }

        let sql = match profile_type {
            ProfileType::Duckdb => Some(std::fs::read_to_string(&path)?),
            ProfileType::Http | ProfileType::File => {
                deep_merge(&mut doc, read_json_object(&path)?);
                None
            }
        };

        if substitute {
            substitute_env(&mut doc);
        }

        match profile_type {
            ProfileType::Http => require_string(&doc, "base_url", &path)?,
            ProfileType::File => require_string(&doc, "pattern", &path)?,
            ProfileType::Duckdb => {}
        }

        Ok(LoadedProfile {
            profile_type,
            tier,
            path,
            doc,
            sql,
        })
    }
}

/// `_meta.json` candidates from the namespace root down through the
/// name's intermediate directories
fn meta_chain(
    root: &Path,
    profile_type: ProfileType,
    namespace: &str,
    name: &str,
) -> Vec<PathBuf> {
    let mut dir = root.join(profile_type.as_str()).join(namespace);
    let mut chain = vec![dir.join(META_FILE)];
    let mut segments: Vec<&str> = name.split('/').collect();
    segments.pop(); // the file itself
    for segment in segments {
        dir = dir.join(segment);
        chain.push(dir.join(META_FILE));
    }
    chain
}

fn read_json_object(path: &Path) -> Result<Value> {
    let body = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&body).map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_object() {
        return Err(Error::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(value)
}

fn require_string(doc: &Value, field: &'static str, path: &Path) -> Result<()> {
    match doc.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        _ => Err(Error::MissingField {
            path: path.to_path_buf(),
            field,
        }),
    }
}

/// Files of one profile type under one tier: `(namespace, name, path)`
fn scan_type_dir(type_dir: &Path, profile_type: ProfileType) -> Vec<(String, String, PathBuf)> {
    let mut found = Vec::new();
    let Ok(namespaces) = std::fs::read_dir(type_dir) else {
        return found;
    };
    for namespace_entry in namespaces.filter_map(|e| e.ok()) {
        let namespace_dir = namespace_entry.path();
        if !namespace_dir.is_dir() {
            continue;
        }
        let namespace = namespace_entry.file_name().to_string_lossy().to_string();
        collect_profiles(
            &namespace_dir,
            &namespace,
            "",
            profile_type,
            &mut found,
        );
    }
    found
}

fn collect_profiles(
    dir: &Path,
    namespace: &str,
    prefix: &str,
    profile_type: ProfileType,
    found: &mut Vec<(String, String, PathBuf)>,
) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if path.is_dir() {
            let nested = if prefix.is_empty() {
                format!("{}/", file_name)
            } else {
                format!("{}{}/", prefix, file_name)
            };
            collect_profiles(&path, namespace, &nested, profile_type, found);
            continue;
        }
        if file_name == META_FILE {
            continue;
        }
        let Some(stem) = file_name.strip_suffix(&format!(".{}", profile_type.extension())) else {
            continue;
        };
        found.push((
            namespace.to_string(),
            format!("{}{}", prefix, stem),
            path,
        ));
    }
}
