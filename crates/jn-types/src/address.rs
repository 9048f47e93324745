use serde::{Deserialize, Serialize};

/// Classification of a user-supplied address string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Stdin,
    File,
    Url,
    Profile,
    Glob,
}

/// Compression inferred from the terminal file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "gz" => Some(Compression::Gzip),
            "bz2" => Some(Compression::Bzip2),
            "xz" => Some(Compression::Xz),
            "zst" => Some(Compression::Zstd),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
            Compression::Xz => "xz",
            Compression::Zstd => "zstd",
        }
    }
}

/// Protocols the resolver knows how to route without consulting the registry
pub const KNOWN_PROTOCOLS: &[&str] = &["http", "https", "s3", "gs", "gcs", "gdrive", "duckdb"];

const GLOB_METACHARS: &[char] = &['*', '?', '['];

/// A parsed address.
///
/// Parsing is total: every input string classifies as exactly one kind.
/// Whether the result is usable is decided downstream by the resolver.
///
/// `path` is the raw location with protocol, format hint, and query removed
/// but compression extension retained (it names the actual file). `format`
/// holds only an explicit `~format` override; use [`Address::effective_format`]
/// for the override-or-inferred value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub raw: String,
    pub kind: AddressKind,
    pub path: String,
    pub protocol: Option<String>,
    pub format: Option<String>,
    pub compression: Compression,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub query: Option<String>,
}

impl Address {
    pub fn parse(input: &str) -> Address {
        // stdin marker, optionally with a format override
        if input == "-" || input.starts_with("-~") {
            let format = input
                .strip_prefix("-~")
                .filter(|f| !f.is_empty())
                .map(str::to_string);
            return Address {
                raw: input.to_string(),
                kind: AddressKind::Stdin,
                path: String::new(),
                protocol: None,
                format,
                compression: Compression::None,
                namespace: None,
                name: None,
                query: None,
            };
        }

        // profile reference: @namespace/name[?query]
        if let Some(body) = input.strip_prefix('@') {
            let (body, query) = split_query(body);
            if let Some(slash) = find_unescaped(body, '/') {
                let namespace = &body[..slash];
                let name = &body[slash + 1..];
                let (name, format) = strip_format_suffix(name);
                if !namespace.is_empty() && !name.is_empty() {
                    return Address {
                        raw: input.to_string(),
                        kind: AddressKind::Profile,
                        path: format!("{}/{}", namespace, name),
                        protocol: None,
                        format: format.map(str::to_string),
                        compression: Compression::None,
                        namespace: Some(namespace.to_string()),
                        name: Some(name.to_string()),
                        query: query.map(str::to_string),
                    };
                }
            }
            // degenerate reference like "@notes" or "@ns/": a file below
        }

        // url: "://" appearing before any path separator
        if let Some(idx) = input.find("://")
            && !input[..idx].contains('/')
        {
            let protocol = &input[..idx];
            let rest = &input[idx + 3..];
            let (rest, query) = split_query(rest);
            let (path, format) = strip_format_suffix(rest);
            let compression = terminal_compression(path);
            return Address {
                raw: input.to_string(),
                kind: AddressKind::Url,
                path: path.to_string(),
                protocol: Some(protocol.to_string()),
                format: format.map(str::to_string),
                compression,
                namespace: None,
                name: None,
                query: query.map(str::to_string),
            };
        }

        // local path: glob when it carries unescaped metacharacters
        let (path, format) = strip_format_suffix(input);
        let compression = terminal_compression(path);
        let kind = if has_unescaped_any(path, GLOB_METACHARS) {
            AddressKind::Glob
        } else {
            AddressKind::File
        };

        Address {
            raw: input.to_string(),
            kind,
            path: path.to_string(),
            protocol: None,
            format: format.map(str::to_string),
            compression,
            namespace: None,
            name: None,
            query: None,
        }
    }

    /// The path with its compression extension stripped, suitable for
    /// extension inference and registry pattern matching.
    pub fn path_for_format_match(&self) -> &str {
        if self.compression == Compression::None {
            return &self.path;
        }
        match self.path.rfind('.') {
            Some(dot) => &self.path[..dot],
            None => &self.path,
        }
    }

    /// The explicit `~format` override when present, else the final
    /// dot-extension of the path after compression stripping.
    pub fn effective_format(&self) -> Option<&str> {
        if let Some(f) = &self.format {
            return Some(f);
        }
        let stripped = self.path_for_format_match();
        let segment = match stripped.rfind('/') {
            Some(slash) => &stripped[slash + 1..],
            None => stripped,
        };
        match segment.rfind('.') {
            // a leading dot is a hidden file, not an extension
            Some(0) | None => None,
            Some(dot) if dot + 1 == segment.len() => None,
            Some(dot) => Some(&segment[dot + 1..]),
        }
    }

    /// Query string decomposed into `(key, value)` pairs. Values keep any
    /// embedded `=` verbatim; a bare key yields an empty value.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(query) = &self.query else {
            return Vec::new();
        };
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect()
    }
}

/// Split off the query string at the first unescaped `?`
fn split_query(s: &str) -> (&str, Option<&str>) {
    match find_unescaped(s, '?') {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    }
}

/// Strip a trailing `~format` from the final path segment
fn strip_format_suffix(path: &str) -> (&str, Option<&str>) {
    let segment_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &path[segment_start..];

    let mut tilde = None;
    let mut escaped = false;
    for (i, c) in segment.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '~' if i > 0 => tilde = Some(i),
            _ => {}
        }
    }

    match tilde {
        Some(i) if i + 1 < segment.len() => {
            let cut = segment_start + i;
            (&path[..cut], Some(&path[cut + 1..]))
        }
        _ => (path, None),
    }
}

/// Compression named by the terminal extension of the final path segment
fn terminal_compression(path: &str) -> Compression {
    let segment = match path.rfind('/') {
        Some(slash) => &path[slash + 1..],
        None => path,
    };
    match segment.rfind('.') {
        Some(dot) if dot > 0 => {
            Compression::from_extension(&segment[dot + 1..]).unwrap_or(Compression::None)
        }
        _ => Compression::None,
    }
}

fn find_unescaped(s: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == target {
            return Some(i);
        }
    }
    None
}

fn has_unescaped_any(s: &str, targets: &[char]) -> bool {
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if targets.contains(&c) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_csv_file() {
        let addr = Address::parse("data.csv.gz");
        assert_eq!(addr.kind, AddressKind::File);
        assert_eq!(addr.path, "data.csv.gz");
        assert_eq!(addr.compression, Compression::Gzip);
        assert_eq!(addr.effective_format(), Some("csv"));
    }

    #[test]
    fn profile_with_query() {
        let addr = Address::parse("@api/users?limit=10");
        assert_eq!(addr.kind, AddressKind::Profile);
        assert_eq!(addr.namespace.as_deref(), Some("api"));
        assert_eq!(addr.name.as_deref(), Some("users"));
        assert_eq!(addr.query.as_deref(), Some("limit=10"));
    }

    #[test]
    fn cloud_url() {
        let addr = Address::parse("s3://bucket/key.json");
        assert_eq!(addr.kind, AddressKind::Url);
        assert_eq!(addr.protocol.as_deref(), Some("s3"));
        assert_eq!(addr.path, "bucket/key.json");
        assert_eq!(addr.effective_format(), Some("json"));
    }

    #[test]
    fn stdin_marker() {
        let addr = Address::parse("-");
        assert_eq!(addr.kind, AddressKind::Stdin);
        assert_eq!(addr.format, None);
        assert_eq!(addr.effective_format(), None);
    }

    #[test]
    fn stdin_with_format_override() {
        let addr = Address::parse("-~csv");
        assert_eq!(addr.kind, AddressKind::Stdin);
        assert_eq!(addr.format.as_deref(), Some("csv"));
        assert_eq!(addr.effective_format(), Some("csv"));
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let addr = Address::parse("data.csv~tsv");
        assert_eq!(addr.kind, AddressKind::File);
        assert_eq!(addr.path, "data.csv");
        assert_eq!(addr.effective_format(), Some("tsv"));
    }

    #[test]
    fn format_override_on_compressed_path() {
        let addr = Address::parse("dump.bin.gz~csv");
        assert_eq!(addr.path, "dump.bin.gz");
        assert_eq!(addr.compression, Compression::Gzip);
        assert_eq!(addr.effective_format(), Some("csv"));
    }

    #[test]
    fn double_extension_keeps_inner_format() {
        let addr = Address::parse("backup/data.tar.gz");
        assert_eq!(addr.compression, Compression::Gzip);
        assert_eq!(addr.path_for_format_match(), "backup/data.tar");
        assert_eq!(addr.effective_format(), Some("tar"));
    }

    #[test]
    fn glob_pattern_detected() {
        assert_eq!(Address::parse("logs/*.jsonl").kind, AddressKind::Glob);
        assert_eq!(Address::parse("data?.csv").kind, AddressKind::Glob);
        assert_eq!(Address::parse("data[12].csv").kind, AddressKind::Glob);
    }

    #[test]
    fn escaped_metacharacters_stay_file() {
        assert_eq!(Address::parse(r"weird\*name.csv").kind, AddressKind::File);
        assert_eq!(Address::parse(r"what\?.json").kind, AddressKind::File);
    }

    #[test]
    fn url_query_preserved_verbatim() {
        let addr = Address::parse("https://api.example.com/v1/users?filter=a=b&limit=5");
        assert_eq!(addr.kind, AddressKind::Url);
        assert_eq!(addr.protocol.as_deref(), Some("https"));
        assert_eq!(addr.path, "api.example.com/v1/users");
        assert_eq!(addr.query.as_deref(), Some("filter=a=b&limit=5"));

        let pairs = addr.query_pairs();
        assert_eq!(pairs[0], ("filter".to_string(), "a=b".to_string()));
        assert_eq!(pairs[1], ("limit".to_string(), "5".to_string()));
    }

    #[test]
    fn unknown_scheme_still_classifies_as_url() {
        let addr = Address::parse("weird://somewhere/thing");
        assert_eq!(addr.kind, AddressKind::Url);
        assert_eq!(addr.protocol.as_deref(), Some("weird"));
    }

    #[test]
    fn duckdb_scheme() {
        let addr = Address::parse("duckdb://analytics.db");
        assert_eq!(addr.kind, AddressKind::Url);
        assert_eq!(addr.protocol.as_deref(), Some("duckdb"));
        assert_eq!(addr.path, "analytics.db");
    }

    #[test]
    fn profile_format_override() {
        let addr = Address::parse("@api/users~csv?limit=10");
        assert_eq!(addr.kind, AddressKind::Profile);
        assert_eq!(addr.name.as_deref(), Some("users"));
        assert_eq!(addr.format.as_deref(), Some("csv"));
        assert_eq!(addr.query.as_deref(), Some("limit=10"));
    }

    #[test]
    fn nested_profile_name() {
        let addr = Address::parse("@api/v2/users");
        assert_eq!(addr.kind, AddressKind::Profile);
        assert_eq!(addr.namespace.as_deref(), Some("api"));
        assert_eq!(addr.name.as_deref(), Some("v2/users"));
    }

    #[test]
    fn at_sign_without_slash_is_a_file() {
        let addr = Address::parse("@notes");
        assert_eq!(addr.kind, AddressKind::File);
        assert_eq!(addr.path, "@notes");
    }

    #[test]
    fn plain_file() {
        let addr = Address::parse("out/result.json");
        assert_eq!(addr.kind, AddressKind::File);
        assert_eq!(addr.path, "out/result.json");
        assert_eq!(addr.compression, Compression::None);
        assert_eq!(addr.effective_format(), Some("json"));
    }

    #[test]
    fn hidden_file_has_no_inferred_format() {
        let addr = Address::parse("dir/.hidden");
        assert_eq!(addr.kind, AddressKind::File);
        assert_eq!(addr.effective_format(), None);
    }

    #[test]
    fn tilde_in_directory_segment_is_not_a_format() {
        let addr = Address::parse("back~up/data.csv");
        assert_eq!(addr.path, "back~up/data.csv");
        assert_eq!(addr.format, None);
        assert_eq!(addr.effective_format(), Some("csv"));
    }

    #[test]
    fn known_protocols_all_classify_as_url() {
        for protocol in KNOWN_PROTOCOLS {
            let addr = Address::parse(&format!("{}://host/path", protocol));
            assert_eq!(addr.kind, AddressKind::Url);
            assert_eq!(addr.protocol.as_deref(), Some(*protocol));
        }
    }

    #[test]
    fn every_input_parses_to_exactly_one_kind() {
        for input in [
            "-",
            "-~json",
            "@ns/name",
            "http://host/p",
            "a/*.csv",
            "plain.txt",
            "",
            "~",
            "@",
            "://",
            "@ns?q=a/b",
            "@/x",
            "@ns/",
        ] {
            let _ = Address::parse(input);
        }
    }
}
