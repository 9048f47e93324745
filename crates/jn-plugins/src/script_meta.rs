//! Inline metadata parser for script plugins.
//!
//! Script plugins carry their metadata in a commented header block:
//!
//! ```text
//! # /// script
//! # [tool.jn]
//! # name = "csv"
//! # matches = [".*\\.csv$"]
//! # ///
//! ```
//!
//! Only the `[tool.jn]` table is extracted. The grammar is the small
//! TOML subset these headers actually use: quoted strings, booleans,
//! base-10 integers, and (possibly multi-line) lists of strings. Lines
//! that do not fit the grammar are skipped.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

pub const START_MARKER: &str = "# /// script";
pub const END_MARKER: &str = "# ///";
const SECTION_HEADER: &str = "[tool.jn]";

/// Parse the `[tool.jn]` table out of a script source.
///
/// `Ok(None)` when the source has no metadata block, no `[tool.jn]`
/// section, or no non-empty `matches` list. `Err(MalformedBlock)` when the
/// block markers are out of order or the block never terminates.
pub fn parse(source: &str) -> Result<Option<Value>> {
    let Some(block) = extract_block(source)? else {
        return Ok(None);
    };
    let Some(lines) = extract_section(&block) else {
        return Ok(None);
    };
    let table = parse_table(&lines);
    match table.get("matches") {
        Some(Value::Array(items)) if !items.is_empty() => Ok(Some(Value::Object(table))),
        _ => Ok(None),
    }
}

/// Collect the comment payload between the block markers
fn extract_block(source: &str) -> Result<Option<Vec<String>>> {
    let mut in_block = false;
    let mut lines = Vec::new();

    for raw in source.lines() {
        let line = raw.trim_end();
        if !in_block {
            if line == START_MARKER {
                in_block = true;
            } else if line == END_MARKER {
                return Err(Error::MalformedBlock(
                    "end marker before start marker".to_string(),
                ));
            }
            continue;
        }
        if line == END_MARKER {
            return Ok(Some(lines));
        }
        if line == START_MARKER {
            return Err(Error::MalformedBlock("nested start marker".to_string()));
        }
        match strip_comment(line) {
            Some(payload) => lines.push(payload.to_string()),
            None => {
                return Err(Error::MalformedBlock(
                    "uncommented line inside metadata block".to_string(),
                ));
            }
        }
    }

    if in_block {
        Err(Error::MalformedBlock(
            "unterminated metadata block".to_string(),
        ))
    } else {
        Ok(None)
    }
}

/// Strip the `# ` comment prefix; empty comment lines yield an empty payload
fn strip_comment(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Lines belonging to `[tool.jn]`, up to the next section or end of block
fn extract_section(block: &[String]) -> Option<Vec<String>> {
    let start = block.iter().position(|l| l.trim() == SECTION_HEADER)?;
    let mut lines = Vec::new();
    for line in &block[start + 1..] {
        if line.trim_start().starts_with('[') {
            break;
        }
        lines.push(line.clone());
    }
    Some(lines)
}

fn parse_table(lines: &[String]) -> Map<String, Value> {
    let mut table = Map::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value_text)) = split_key_value(line) else {
            continue;
        };

        let mut value_text = value_text.to_string();
        if value_text.starts_with('[') && !array_closed(&value_text) {
            while i < lines.len() {
                let next = lines[i].trim();
                // a fresh assignment means the array never closed
                if split_key_value(next).is_some() {
                    break;
                }
                value_text.push(' ');
                value_text.push_str(next);
                i += 1;
                if array_closed(&value_text) {
                    break;
                }
            }
            // unterminated array: salvage whatever items parsed so far
            if !array_closed(&value_text) {
                value_text.push(']');
            }
        }

        if let Some(value) = parse_value(value_text.trim()) {
            table.insert(key.to_string(), value);
        }
    }

    table
}

/// Split `key = value`, requiring a bare-word key
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    Some((key, value.trim()))
}

/// True when the closing `]` is the last non-whitespace character and sits
/// outside any string literal
fn array_closed(s: &str) -> bool {
    let trimmed = s.trim_end();
    if !trimmed.ends_with(']') {
        return false;
    }
    let mut in_string = false;
    let mut escaped = false;
    for c in trimmed.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        }
    }
    !in_string
}

fn parse_value(s: &str) -> Option<Value> {
    match s {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }
    if s.starts_with('"') {
        let (text, consumed) = parse_quoted(s)?;
        if s[consumed..].trim().is_empty() {
            return Some(Value::String(text));
        }
        return None;
    }
    if s.starts_with('[') && s.ends_with(']') {
        return Some(Value::Array(parse_string_list(&s[1..s.len() - 1])));
    }
    s.parse::<i64>().ok().map(Value::from)
}

/// Parse one double-quoted string starting at the beginning of `s`.
/// Returns the unescaped text and the byte length consumed.
fn parse_quoted(s: &str) -> Option<(String, usize)> {
    let mut chars = s.char_indices();
    let (_, first) = chars.next()?;
    if first != '"' {
        return None;
    }
    let mut out = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            match c {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => out.push(other),
            }
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return Some((out, i + 1)),
            _ => out.push(c),
        }
    }
    None
}

/// Collect every quoted string inside a list body, skipping separators
fn parse_string_list(body: &str) -> Vec<Value> {
    let mut items = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find('"') {
        match parse_quoted(&rest[start..]) {
            Some((text, consumed)) => {
                items.push(Value::String(text));
                rest = &rest[start + consumed..];
            }
            None => break,
        }
    }
    items
}
