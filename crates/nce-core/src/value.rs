//! Value normalization: null pruning, read-only stripping, deep merge, and
//! the canonical form used for order-insensitive list comparison.
//!
//! All operations are pure -- they take references and return new values --
//! and total for any JSON value.

use serde_json::{Map, Value};

use nce_api::Record;

/// Field names owned by the remote system. Never sent back in create or
/// update payloads; stripped from current-state snapshots before they are
/// compared or merged with a desired object.
pub const READONLY_KEYS: &[&str] = &[
    "id",
    "uuid",
    "createTime",
    "create_time",
    "createdAt",
    "updateTime",
    "update_time",
    "updatedAt",
];

/// Remove mapping entries whose value is null, recursively.
///
/// Null means "not specified" on the wire; inside the core an unspecified
/// field is simply absent. Explicitly empty mappings and sequences are
/// preserved -- `{"c": {"d": null}}` prunes to `{"c": {}}`, not to `{}`.
pub fn prune(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if !v.is_null() {
                    out.insert(k.clone(), prune(v));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(prune).collect()),
        other => other.clone(),
    }
}

/// [`prune`] specialized to a record.
pub fn prune_record(record: &Record) -> Record {
    let mut out = Map::new();
    for (k, v) in record {
        if !v.is_null() {
            out.insert(k.clone(), prune(v));
        }
    }
    out
}

/// Remove entries whose key is in `readonly_keys`, recursively.
///
/// Sequence element order and non-matching keys are untouched.
pub fn strip_readonly(value: &Value, readonly_keys: &[&str]) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if !readonly_keys.contains(&k.as_str()) {
                    out.insert(k.clone(), strip_readonly(v, readonly_keys));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| strip_readonly(v, readonly_keys))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Merge `overlay` into `base` recursively, overlay winning on conflicting
/// paths. Mappings merge key-by-key; lists and scalars are replaced
/// wholesale. Neither input is mutated.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => {
            let mut merged = b.clone();
            for (k, v) in o {
                let next = match merged.get(k) {
                    Some(existing) => deep_merge(existing, v),
                    None => v.clone(),
                };
                merged.insert(k.clone(), next);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

/// Deterministic serialization of a value, independent of the original key
/// order inside nested mappings.
///
/// Equal values always canonicalize to the same string, which is what makes
/// order-insensitive list comparison (sort elements by canonical key) stable
/// across runs and therefore update-idempotent.
pub fn canonical_key(value: &Value) -> String {
    serde_json::to_string(&canonicalize(value)).unwrap_or_default()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::new();
            for (k, v) in entries {
                out.insert(k.clone(), canonicalize(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
