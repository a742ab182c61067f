//! Local `$ref` resolution.
//!
//! Substitutes `#/...` pointers with the value they point to. The set of
//! pointers currently being expanded is threaded through every call, so a
//! pointer met again while still in flight is left unresolved instead of
//! recursing forever.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::diagnostics::{Warning, WarningCode, Warnings};
use crate::value::Value;

/// Resolve every local `$ref` in `value` against `root`.
///
/// Only objects whose single key is `$ref` are followed; a `$ref` next to
/// other keys is kept as-is while those other values are resolved.
/// References that cannot be followed (non-local, missing target, or cyclic)
/// are left in place as the original `$ref` object.
pub fn resolve_refs(value: &Value, root: &Value) -> Value {
    resolve_refs_with_warnings(value, root).0
}

/// Like [`resolve_refs`], also returning a warning for every reference
/// that was left unresolved.
pub fn resolve_refs_with_warnings(value: &Value, root: &Value) -> (Value, Vec<Warning>) {
    let mut in_flight = HashSet::new();
    let mut warnings = Warnings::default();
    let resolved = resolve_value(value, root, "", &mut in_flight, &mut warnings);
    (resolved, warnings.into_vec())
}

/// Returns the pointer of a node shaped `{"$ref": "<string>"}`.
///
/// With `allow_siblings`, other keys next to `$ref` don't disqualify it.
pub(crate) fn ref_pointer(value: &Value, allow_siblings: bool) -> Option<&str> {
    let Value::Object(map) = value else {
        return None;
    };
    if map.len() > 1 && !allow_siblings {
        return None;
    }
    map.get("$ref").and_then(Value::as_str)
}

/// Encode a key as one JSON Pointer segment (`~` → `~0`, `/` → `~1`).
pub(crate) fn escape_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Navigate a JSON Pointer fragment (e.g., "#/$defs/foo" or "#/properties/bar").
///
/// Returns `None` as soon as a segment names nothing in the current node.
/// Array nodes are indexed by decimal segments.
pub fn navigate_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let path = pointer.strip_prefix('#')?;
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(arr) => arr.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn resolve_value(
    value: &Value,
    root: &Value,
    path: &str,
    in_flight: &mut HashSet<String>,
    warnings: &mut Warnings,
) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(pointer) = ref_pointer(value, false) {
                return resolve_ref(map, pointer, root, path, in_flight, warnings);
            }
            let resolved = map
                .iter()
                .map(|(key, child)| {
                    let child_path = format!("{}/{}", path, escape_segment(key));
                    let child = resolve_value(child, root, &child_path, in_flight, warnings);
                    (key.clone(), child)
                })
                .collect();
            Value::Object(resolved)
        }
        Value::Array(arr) => Value::Array(
            arr.iter()
                .enumerate()
                .map(|(i, item)| {
                    let item_path = format!("{}/{}", path, i);
                    resolve_value(item, root, &item_path, in_flight, warnings)
                })
                .collect(),
        ),
        // Scalars pass through unchanged
        other => other.clone(),
    }
}

fn resolve_ref(
    map: &IndexMap<String, Value>,
    pointer: &str,
    root: &Value,
    path: &str,
    in_flight: &mut HashSet<String>,
    warnings: &mut Warnings,
) -> Value {
    let Some(target) = lookup_ref(map, pointer, root, path, in_flight, warnings) else {
        return Value::Object(map.clone());
    };

    in_flight.insert(pointer.to_string());
    let resolved = resolve_value(&target, root, path, in_flight, warnings);
    in_flight.remove(pointer);
    resolved
}

/// Follow one `$ref` step without descending into the target.
///
/// Returns the target, with any sibling keys of the `$ref` object merged over
/// it, or `None` (after recording a warning) when the pointer is non-local,
/// dangling, or already in flight. Callers decide whether a `$ref` with
/// siblings is followed at all.
pub(crate) fn lookup_ref(
    map: &IndexMap<String, Value>,
    pointer: &str,
    root: &Value,
    path: &str,
    in_flight: &HashSet<String>,
    warnings: &mut Warnings,
) -> Option<Value> {
    let ref_path = format!("{}/$ref", path);

    if !pointer.starts_with('#') {
        warnings.push(
            WarningCode::NonLocalRef,
            &ref_path,
            format!("reference {} is not a local pointer; left unresolved", pointer),
        );
        return None;
    }

    if in_flight.contains(pointer) {
        warnings.push(
            WarningCode::CyclicRef,
            &ref_path,
            format!("reference {} is cyclic; left unresolved", pointer),
        );
        return None;
    }

    let Some(target) = navigate_pointer(root, pointer) else {
        warnings.push(
            WarningCode::DanglingRef,
            &ref_path,
            format!("reference {} not found", pointer),
        );
        return None;
    };

    tracing::debug!(pointer, path, "expanding reference");

    // Sibling keys next to $ref annotate the target and take precedence
    match target {
        Value::Object(target_map) if map.len() > 1 => {
            let mut merged = target_map.clone();
            for (key, sibling) in map {
                if key != "$ref" {
                    merged.insert(key.clone(), sibling.clone());
                }
            }
            Some(Value::Object(merged))
        }
        other => Some(other.clone()),
    }
}
