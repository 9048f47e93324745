use serde_json::Value;

/// Substitute `${VAR}` and `${VAR:-fallback}` in every string value of a
/// document. An undefined variable with no fallback substitutes to the
/// empty string; a fallback applies when the variable is unset or empty.
pub fn substitute_env(value: &mut Value) {
    match value {
        Value::String(s) => *s = substitute_str(s),
        Value::Array(items) => items.iter_mut().for_each(substitute_env),
        Value::Object(map) => map.values_mut().for_each(substitute_env),
        _ => {}
    }
}

pub fn substitute_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                out.push_str(&resolve(&after[..end]));
                rest = &after[end + 1..];
            }
            None => {
                // unterminated reference stays literal
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve(expr: &str) -> String {
    let (var, fallback) = match expr.split_once(":-") {
        Some((var, fallback)) => (var, Some(fallback)),
        None => (expr, None),
    };
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => fallback.unwrap_or("").to_string(),
    }
}
