use crate::error::{Error, Result};
use crate::globbing;
use crate::pipeline::{PipelineInput, PipelineSpec, PipelineStage};
use jn_plugins::Registry;
use jn_profiles::{LoadedProfile, ProfileService, ProfileType};
use jn_types::{Address, AddressKind, Compression, Mode, PluginInfo, Role};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The system URL fetcher, found on PATH
pub const CURL_PROGRAM: &str = "curl";

/// Format assumed when an address gives no other hint
pub const DEFAULT_FORMAT: &str = "jsonl";

/// Formats that are already NDJSON and need no reader stage
const PASSTHROUGH_FORMATS: &[&str] = &["jsonl", "ndjson"];

/// Profile namespace routed to its own plugin instead of the profile tree
const CODE_NAMESPACE: &str = "code";

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub mode: Mode,
    /// Reader flags forwarded verbatim to the format stage (e.g. `--delimiter=;`)
    pub extra_flags: Vec<String>,
    /// Extra HTTP headers for URL fetches
    pub headers: Vec<String>,
    /// Prepend `_path`/`_file_index`/… metadata when reading many files
    pub inject_meta: bool,
    /// Treat a glob that expands to nothing as an error
    pub require_match: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Read,
            extra_flags: Vec::new(),
            headers: Vec::new(),
            inject_meta: false,
            require_match: false,
        }
    }
}

/// Turns a parsed address into pipeline specifications.
///
/// Stateless: each resolve call is independent, so one resolver can serve
/// any number of addresses against the same catalog.
pub struct Resolver<'a> {
    registry: &'a Registry,
    profiles: &'a ProfileService,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, profiles: &'a ProfileService) -> Self {
        Self { registry, profiles }
    }

    /// Resolve to one pipeline per input source. Globs yield one pipeline
    /// per expanded file; everything else yields exactly one. An empty
    /// list means there is nothing to do (a benign zero-match glob).
    pub fn resolve(&self, addr: &Address, opts: &ResolveOptions) -> Result<Vec<PipelineSpec>> {
        match addr.kind {
            AddressKind::Stdin => self.stdin_pipeline(addr, opts).map(|s| vec![s]),
            AddressKind::File => self.file_pipeline(addr, opts, None).map(|s| vec![s]),
            AddressKind::Url => self.url_pipeline(addr, opts).map(|s| vec![s]),
            AddressKind::Profile => self.profile_pipelines(addr, opts),
            AddressKind::Glob => self.glob_pipelines(addr, opts),
        }
    }

    fn stdin_pipeline(&self, addr: &Address, opts: &ResolveOptions) -> Result<PipelineSpec> {
        let (mode, flags) = stage_plan(addr, opts, true);
        let format = addr.effective_format().unwrap_or(DEFAULT_FORMAT);
        if is_passthrough(format) && flags.is_empty() {
            return Ok(PipelineSpec::passthrough(PipelineInput::Inherit));
        }
        let plugin = self
            .registry
            .find_for_format(format, mode)
            .ok_or_else(|| no_plugin(addr))?;
        Ok(PipelineSpec {
            input: PipelineInput::Inherit,
            stages: vec![plugin_stage(plugin, mode, flags, None)],
        })
    }

    /// Decompressor (if any) followed by a format reader, fed by the file
    fn file_pipeline(
        &self,
        addr: &Address,
        opts: &ResolveOptions,
        meta: Option<(&Path, usize)>,
    ) -> Result<PipelineSpec> {
        let path = PathBuf::from(&addr.path);
        if !path.is_file() {
            return Err(Error::FileNotFound { path });
        }

        let (mode, mut flags) = stage_plan(addr, opts, true);
        if let Some((meta_path, index)) = meta {
            flags.extend(meta_flags(meta_path, index));
        }

        let mut stages = Vec::new();
        if addr.compression != Compression::None {
            stages.push(self.compression_stage(addr)?);
        }
        if let Some(plugin) = self.file_format_plugin(addr, mode, !flags.is_empty())? {
            stages.push(plugin_stage(plugin, mode, flags, None));
        }

        Ok(PipelineSpec {
            input: PipelineInput::File(path),
            stages,
        })
    }

    /// Format plugin for a local file: explicit `~format` wins, then
    /// registry patterns over the decompressed path. jsonl-family data
    /// streams through with no stage at all unless flags need a plugin to
    /// interpret them.
    fn file_format_plugin(
        &self,
        addr: &Address,
        mode: Mode,
        have_flags: bool,
    ) -> Result<Option<&PluginInfo>> {
        if let Some(format) = addr.format.as_deref() {
            if is_passthrough(format) && !have_flags {
                return Ok(None);
            }
            return match self.registry.find_for_format(format, mode) {
                Some(plugin) => Ok(Some(plugin)),
                None => Err(no_plugin(addr)),
            };
        }
        if let Some(plugin) =
            self.registry
                .find_in_roles(addr.path_for_format_match(), mode, &[Role::Format])
        {
            return Ok(Some(plugin));
        }
        match addr.effective_format() {
            Some(format) if is_passthrough(format) && !have_flags => Ok(None),
            _ => Err(no_plugin(addr)),
        }
    }

    fn url_pipeline(&self, addr: &Address, opts: &ResolveOptions) -> Result<PipelineSpec> {
        let protocol = addr.protocol.clone().unwrap_or_default();
        match protocol.as_str() {
            "http" | "https" => {
                // the query belongs to the URL itself, not to plugin flags
                let (mode, flags) = stage_plan(addr, opts, false);
                let url = rebuild_url(addr);
                let mut stages = vec![curl_stage(&url, &opts.headers)?];
                if addr.compression != Compression::None {
                    stages.push(self.compression_stage(addr)?);
                }
                match self.url_format_plugin(addr, mode, None)? {
                    Some(plugin) => stages.push(plugin_stage(plugin, mode, flags, None)),
                    None if !flags.is_empty() => return Err(no_plugin(addr)),
                    None => {}
                }
                Ok(PipelineSpec {
                    input: PipelineInput::Null,
                    stages,
                })
            }
            "" => Err(Error::UnsupportedProtocol {
                protocol,
                address: addr.raw.clone(),
            }),
            _ => self.protocol_plugin_pipeline(addr, opts, protocol),
        }
    }

    /// Cloud-storage and database URLs route through whichever plugin
    /// claims the full address. A raw-capable plugin becomes a byte
    /// source feeding the usual decompress/format chain; a read-only
    /// plugin emits NDJSON itself and stands alone.
    fn protocol_plugin_pipeline(
        &self,
        addr: &Address,
        opts: &ResolveOptions,
        protocol: String,
    ) -> Result<PipelineSpec> {
        if let Some(source) =
            self.registry
                .find_in_roles(&addr.raw, Mode::Raw, &[Role::Protocol, Role::Database])
        {
            let mut stages = vec![plugin_stage(source, Mode::Raw, Vec::new(), Some(&addr.raw))];
            if addr.compression != Compression::None {
                stages.push(self.compression_stage(addr)?);
            }
            let (mode, flags) = stage_plan(addr, opts, true);
            match self.url_format_plugin(addr, mode, None)? {
                Some(plugin) => stages.push(plugin_stage(plugin, mode, flags, None)),
                None if !flags.is_empty() => return Err(no_plugin(addr)),
                None => {}
            }
            return Ok(PipelineSpec {
                input: PipelineInput::Null,
                stages,
            });
        }

        if let Some(plugin) =
            self.registry
                .find_in_roles(&addr.raw, opts.mode, &[Role::Protocol, Role::Database])
        {
            let (mode, flags) = stage_plan(addr, opts, true);
            return Ok(PipelineSpec {
                input: PipelineInput::Null,
                stages: vec![plugin_stage(plugin, mode, flags, Some(&addr.raw))],
            });
        }

        Err(Error::UnsupportedProtocol {
            protocol,
            address: addr.raw.clone(),
        })
    }

    /// Format plugin for fetched bytes: explicit `~format`, then a
    /// profile-supplied format, then path-extension patterns. Absence is
    /// fine; API responses are commonly NDJSON already.
    fn url_format_plugin(
        &self,
        addr: &Address,
        mode: Mode,
        profile_format: Option<&str>,
    ) -> Result<Option<&PluginInfo>> {
        if let Some(format) = addr.format.as_deref().or(profile_format) {
            if is_passthrough(format) {
                return Ok(None);
            }
            return match self.registry.find_for_format(format, mode) {
                Some(plugin) => Ok(Some(plugin)),
                None => Err(no_plugin(addr)),
            };
        }
        Ok(self
            .registry
            .find_in_roles(addr.path_for_format_match(), mode, &[Role::Format]))
    }

    fn profile_pipelines(
        &self,
        addr: &Address,
        opts: &ResolveOptions,
    ) -> Result<Vec<PipelineSpec>> {
        let (Some(namespace), Some(name)) = (addr.namespace.clone(), addr.name.clone()) else {
            return Err(Error::InvalidAddress {
                address: addr.raw.clone(),
            });
        };

        // @code/... is understood natively by its plugin
        if namespace == CODE_NAMESPACE {
            let (mode, flags) = stage_plan(addr, opts, true);
            let plugin = self
                .registry
                .find_in_roles(&addr.raw, mode, &[Role::Protocol])
                .ok_or_else(|| no_plugin(addr))?;
            return Ok(vec![PipelineSpec {
                input: PipelineInput::Null,
                stages: vec![plugin_stage(plugin, mode, flags, Some(&addr.raw))],
            }]);
        }

        let Some((profile_type, _, _)) = self.profiles.locate_any(&namespace, &name) else {
            return Err(Error::Profile(jn_profiles::Error::NotFound {
                namespace,
                name,
            }));
        };
        let profile = self.profiles.load(profile_type, &namespace, &name, true)?;

        match profile_type {
            ProfileType::Http => self.http_profile_pipeline(addr, opts, &profile).map(|s| vec![s]),
            ProfileType::Duckdb => self
                .duckdb_profile_pipeline(addr, opts, &profile)
                .map(|s| vec![s]),
            ProfileType::File => self.file_profile_pipelines(addr, opts, &profile),
        }
    }

    /// curl against base_url + path (+ the address query), then a format
    /// stage when one is named
    fn http_profile_pipeline(
        &self,
        addr: &Address,
        opts: &ResolveOptions,
        profile: &LoadedProfile,
    ) -> Result<PipelineSpec> {
        let doc = &profile.doc;
        let base = doc.get("base_url").and_then(Value::as_str).unwrap_or("");
        let path = doc.get("path").and_then(Value::as_str).unwrap_or("");

        let mut url = format!("{}{}", base, path);
        if let Some(query) = &addr.query {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(query);
        }

        let mut headers = Vec::new();
        if let Some(map) = doc.get("headers").and_then(Value::as_object) {
            for (key, value) in map {
                if let Some(text) = value.as_str() {
                    headers.push(format!("{}: {}", key, text));
                }
            }
        }
        headers.extend(opts.headers.iter().cloned());

        let mut stages = vec![curl_stage(&url, &headers)?];
        let (mode, flags) = stage_plan(addr, opts, false);
        let profile_format = doc.get("format").and_then(Value::as_str);
        match self.url_format_plugin(addr, mode, profile_format)? {
            Some(plugin) => stages.push(plugin_stage(plugin, mode, flags, None)),
            None if !flags.is_empty() => return Err(no_plugin(addr)),
            None => {}
        }

        Ok(PipelineSpec {
            input: PipelineInput::Null,
            stages,
        })
    }

    /// One database-plugin stage carrying the SQL text, database path,
    /// merged parameters, and query overrides
    fn duckdb_profile_pipeline(
        &self,
        addr: &Address,
        opts: &ResolveOptions,
        profile: &LoadedProfile,
    ) -> Result<PipelineSpec> {
        let plugin = self
            .registry
            .find_by_profile_type("duckdb", Mode::Read)
            .or_else(|| self.registry.find_by_name("duckdb", Mode::Read))
            .ok_or_else(|| no_plugin(addr))?;

        let (mode, query_flags) = stage_plan(addr, opts, true);
        let mut flags = Vec::new();
        if let Some(database) = profile.doc.get("database").and_then(Value::as_str) {
            flags.push(format!("--database={}", database));
        }
        if let Some(sql) = &profile.sql {
            flags.push(format!("--sql={}", sql));
        }
        if let Some(params) = profile.doc.get("params").and_then(Value::as_object) {
            for (key, value) in params {
                flags.push(format!("--{}={}", key.replace('_', "-"), flag_value(value)));
            }
        }
        flags.extend(query_flags);

        Ok(PipelineSpec {
            input: PipelineInput::Null,
            stages: vec![plugin_stage(plugin, mode, flags, None)],
        })
    }

    /// Expand the profile's pattern and read each file, optionally
    /// injecting metadata and piping through the profile's filter program
    fn file_profile_pipelines(
        &self,
        addr: &Address,
        opts: &ResolveOptions,
        profile: &LoadedProfile,
    ) -> Result<Vec<PipelineSpec>> {
        let pattern = profile
            .doc
            .get("pattern")
            .and_then(Value::as_str)
            .unwrap_or("");
        let files = globbing::expand(pattern)?;
        if files.is_empty() {
            return Err(Error::NoFilesMatch {
                pattern: pattern.to_string(),
            });
        }

        let inject = opts.inject_meta
            || profile
                .doc
                .get("meta")
                .and_then(Value::as_bool)
                .unwrap_or(false);
        let filter = filter_argv(profile.doc.get("filter"));

        // the profile address's query flags apply to every file's reader
        let mut file_opts = opts.clone();
        let (mode, query_flags) = stage_plan(addr, opts, true);
        file_opts.mode = mode;
        file_opts.extra_flags = query_flags;

        let mut specs = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let mut file_addr = Address::parse(&file.to_string_lossy());
            if addr.format.is_some() {
                file_addr.format = addr.format.clone();
            }
            let meta = inject.then_some((file.as_path(), index));
            let mut spec = self.file_pipeline(&file_addr, &file_opts, meta)?;
            if let Some(argv) = &filter {
                spec.stages
                    .push(PipelineStage::new(&argv[0], argv[1..].to_vec()));
            }
            specs.push(spec);
        }
        Ok(specs)
    }

    fn glob_pipelines(&self, addr: &Address, opts: &ResolveOptions) -> Result<Vec<PipelineSpec>> {
        let files = globbing::expand(&addr.path)?;
        if files.is_empty() {
            if opts.require_match {
                return Err(Error::NoFilesMatch {
                    pattern: addr.path.clone(),
                });
            }
            return Ok(Vec::new());
        }

        let mut specs = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let mut file_addr = Address::parse(&file.to_string_lossy());
            if addr.format.is_some() {
                file_addr.format = addr.format.clone();
            }
            let meta = opts.inject_meta.then_some((file.as_path(), index));
            specs.push(self.file_pipeline(&file_addr, opts, meta)?);
        }
        Ok(specs)
    }

    fn compression_stage(&self, addr: &Address) -> Result<PipelineStage> {
        let tag = addr.compression.as_str();
        let plugin = self
            .registry
            .find_compression(tag)
            .ok_or(Error::UnsupportedCompression {
                tag,
                address: addr.raw.clone(),
            })?;
        Ok(plugin_stage(plugin, Mode::Raw, Vec::new(), None))
    }
}

fn is_passthrough(format: &str) -> bool {
    PASSTHROUGH_FORMATS.contains(&format)
}

fn no_plugin(addr: &Address) -> Error {
    Error::NoPluginForAddress {
        address: addr.raw.clone(),
    }
}

/// Effective mode and flag list for the format stage: forwarded reader
/// flags first, then query parameters as `--key=value` with underscores
/// turned into hyphens. A reserved `mode` key overrides the request mode.
fn stage_plan(addr: &Address, opts: &ResolveOptions, include_query: bool) -> (Mode, Vec<String>) {
    let mut mode = opts.mode;
    let mut flags = opts.extra_flags.clone();
    if include_query {
        for (key, value) in addr.query_pairs() {
            if key == "mode" {
                if let Some(parsed) = Mode::parse(&value) {
                    mode = parsed;
                }
                continue;
            }
            flags.push(format!("--{}={}", key.replace('_', "-"), value));
        }
    }
    (mode, flags)
}

fn plugin_stage(
    plugin: &PluginInfo,
    mode: Mode,
    flags: Vec<String>,
    positional: Option<&str>,
) -> PipelineStage {
    let mut args = vec![format!("--mode={}", mode.as_str())];
    args.extend(flags);
    if let Some(address) = positional {
        args.push(address.to_string());
    }
    PipelineStage::new(plugin.path.clone(), args)
}

fn meta_flags(path: &Path, index: usize) -> Vec<String> {
    vec![
        "--inject-meta".to_string(),
        format!("--meta-path={}", path.display()),
        format!("--meta-file-index={}", index),
    ]
}

fn rebuild_url(addr: &Address) -> String {
    let protocol = addr.protocol.as_deref().unwrap_or("");
    let mut url = format!("{}://{}", protocol, addr.path);
    if let Some(query) = &addr.query {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Fetcher stage: silent, follow redirects, fail on HTTP errors. Header
/// values carrying CR or LF are rejected outright.
fn curl_stage(url: &str, headers: &[String]) -> Result<PipelineStage> {
    let mut args = vec!["-sS".to_string(), "-L".to_string(), "-f".to_string()];
    for header in headers {
        if header.contains('\r') || header.contains('\n') {
            return Err(Error::UnsafeHeader {
                header: header.clone(),
            });
        }
        args.push("-H".to_string());
        args.push(header.clone());
    }
    args.push(url.to_string());
    Ok(PipelineStage::new(CURL_PROGRAM, args))
}

/// A profile's filter is a program name or an argv list
fn filter_argv(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        Some(Value::String(program)) => Some(vec![program.clone()]),
        Some(Value::Array(items)) => {
            let argv: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            (!argv.is_empty()).then_some(argv)
        }
        _ => None,
    }
}

fn flag_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
