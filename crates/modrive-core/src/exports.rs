//! Conditional `exports`/`imports` map evaluation.
//!
//! Maps a package-relative subpath plus a set of active conditions to a
//! concrete `./`-relative target, per the `package.json` map algorithm:
//! subpath maps (exact keys win over `*` patterns), flat condition maps for
//! the `.` subpath, and nested condition objects walked in declaration order.
//!
//! No match is never an error here; callers fall back to `main`/`index`
//! semantics.

use serde_json::Value;
use std::collections::HashSet;

/// Resolve a subpath (`"."` or `"./x"`) through an `exports` map.
///
/// Returns the target path (starting with `./`) if the map yields one.
#[must_use]
pub fn resolve_exports(
    exports: &Value,
    subpath: &str,
    conditions: &HashSet<String>,
) -> Option<String> {
    match exports {
        // String shorthand covers the root subpath only.
        Value::String(_) => {
            if subpath == "." {
                select_target(exports, conditions)
            } else {
                None
            }
        }
        Value::Object(map) => {
            if map.keys().all(|key| key.starts_with('.')) {
                // Subpath map: exact match wins over any pattern form.
                if let Some(value) = map.get(subpath) {
                    if let Some(target) = select_target(value, conditions) {
                        return Some(target);
                    }
                }
                resolve_pattern(map, subpath, conditions)
            } else if subpath == "." {
                // Flat condition map, valid for the root subpath only.
                select_target(exports, conditions)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Resolve a `#name` specifier through an `imports` map. Exact match only.
#[must_use]
pub fn resolve_imports(
    imports: &Value,
    name: &str,
    conditions: &HashSet<String>,
) -> Option<String> {
    if !name.starts_with('#') {
        return None;
    }

    let map = imports.as_object()?;
    let value = map.get(name)?;
    select_target(value, conditions)
}

/// Match `subpath` against single-`*` pattern keys, most specific (longest
/// key) first, and substitute the matched span into the selected target.
fn resolve_pattern(
    map: &serde_json::Map<String, Value>,
    subpath: &str,
    conditions: &HashSet<String>,
) -> Option<String> {
    let mut matches: Vec<(&str, &Value, String)> = Vec::new();

    for (key, value) in map {
        if key.chars().filter(|&c| c == '*').count() != 1 || !key.starts_with("./") {
            continue;
        }
        if let Some(star) = match_pattern(key, subpath) {
            matches.push((key.as_str(), value, star));
        }
    }

    matches.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let (_, value, star) = matches.first()?;
    let target = select_target(value, conditions)?;
    substitute_star(&target, star)
}

/// Extract the `*` span when `subpath` matches `pattern`.
fn match_pattern(pattern: &str, subpath: &str) -> Option<String> {
    let star_pos = pattern.find('*')?;
    let prefix = &pattern[..star_pos];
    let suffix = &pattern[star_pos + 1..];

    if !subpath.starts_with(prefix) {
        return None;
    }
    if !suffix.is_empty() && !subpath.ends_with(suffix) {
        return None;
    }

    let start = prefix.len();
    let end = subpath.len().checked_sub(suffix.len())?;
    if start >= end {
        return None;
    }

    Some(subpath[start..end].to_string())
}

/// Substitute the matched span into a single-`*` target.
fn substitute_star(target: &str, star: &str) -> Option<String> {
    if target.chars().filter(|&c| c == '*').count() != 1 {
        return None;
    }

    let result = target.replace('*', star);
    validate_target(&result)
}

/// Select a concrete target from a map value.
///
/// Strings are validated directly. Condition objects are walked in
/// declaration order: the first key that is `"default"` or present in the
/// active condition set wins; nested objects recurse; a matched branch that
/// yields nothing falls through to the next key.
fn select_target(value: &Value, conditions: &HashSet<String>) -> Option<String> {
    match value {
        Value::String(target) => validate_target(target),
        Value::Object(map) => {
            for (key, nested) in map {
                if key == "default" || conditions.contains(key) {
                    if let Some(target) = select_target(nested, conditions) {
                        return Some(target);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

/// Targets must be `./`-relative and stay inside the package.
fn validate_target(target: &str) -> Option<String> {
    if !target.starts_with("./") {
        return None;
    }
    if target.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(target.to_string())
}
