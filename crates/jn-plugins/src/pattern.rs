//! The small pattern dialect plugins use to claim addresses.
//!
//! Supported shapes: `^prefix` (anchored prefix), `.*suffix$` (suffix with
//! `\X` escapes), `suffix$` (literal suffix), `a|b|c` (disjunction, first
//! matching branch wins), and plain exact equality. Anything richer is out
//! of the vocabulary plugins actually use.

const METACHARS: &[char] = &['.', '*', '?', '[', ']', '(', ')', '{', '}', '|', '^', '$', '+'];

/// Match `pattern` against `address`.
///
/// Returns the length of the matched literal text (the specificity used for
/// scoring), or `None` when the pattern does not apply. A zero-length
/// pattern never matches.
pub fn match_pattern(pattern: &str, address: &str) -> Option<usize> {
    if pattern.is_empty() {
        return None;
    }
    for branch in split_branches(pattern) {
        if let Some(len) = match_single(branch, address) {
            return Some(len);
        }
    }
    None
}

fn match_single(pattern: &str, address: &str) -> Option<usize> {
    if pattern.is_empty() {
        return None;
    }

    if let Some(rest) = pattern.strip_prefix('^') {
        let literal = literal_prefix(rest);
        if literal.is_empty() {
            return None;
        }
        return address.starts_with(&literal).then_some(literal.len());
    }

    if let Some(body) = pattern.strip_prefix(".*") {
        if let Some(body) = body.strip_suffix('$') {
            let literal = unescape(body);
            if literal.is_empty() {
                return None;
            }
            return address.ends_with(&literal).then_some(literal.len());
        }
    }

    if let Some(body) = pattern.strip_suffix('$') {
        let literal = unescape(body);
        if literal.is_empty() {
            return None;
        }
        return address.ends_with(&literal).then_some(literal.len());
    }

    (unescape(pattern) == address).then_some(address.len())
}

/// Split a disjunction on unescaped `|`
fn split_branches(pattern: &str) -> Vec<&str> {
    let mut branches = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '|' => {
                branches.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    branches.push(&pattern[start..]);
    branches
}

/// Literal characters of a prefix pattern, stopping at the first unescaped
/// metacharacter. `\.` unescapes as `.`.
fn literal_prefix(s: &str) -> String {
    let mut literal = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                literal.push(next);
            }
            continue;
        }
        if METACHARS.contains(&c) {
            break;
        }
        literal.push(c);
    }
    literal
}

/// Drop single-character escapes, keeping the escaped character
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        out.push(c);
    }
    out
}
