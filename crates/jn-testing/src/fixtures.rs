//! Canned plugin bodies for test worlds.

/// `--jn-meta` JSON for a minimal format plugin
pub fn meta_json(name: &str, matches: &[&str]) -> String {
    let matches: Vec<String> = matches.iter().map(|m| format!("{:?}", m)).collect();
    format!(
        r#"{{"name": "{}", "matches": [{}]}}"#,
        name,
        matches.join(", ")
    )
}

/// A fake native plugin: a shell script that answers `--jn-meta` with the
/// given JSON and otherwise echoes its stdin (a working jsonl-ish reader)
pub fn native_plugin_body(meta_json: &str) -> String {
    format!(
        "#!/bin/sh\nif [ \"$1\" = \"--jn-meta\" ]; then\ncat <<'EOF'\n{}\nEOF\nexit 0\nfi\ncat\n",
        meta_json
    )
}

/// A script plugin source with an inline metadata header
pub fn script_plugin_source(name: &str, matches: &[&str]) -> String {
    let list: Vec<String> = matches.iter().map(|m| format!("{:?}", m)).collect();
    format!(
        "#!/usr/bin/env python3\n# /// script\n# [tool.jn]\n# name = \"{}\"\n# matches = [{}]\n# ///\n\nimport sys\n",
        name,
        list.join(", ")
    )
}
