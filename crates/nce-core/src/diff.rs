//! Structured diffing between a current record and a desired subset.
//!
//! Comparison is one-directional: recursion is keyed by the desired object's
//! shape, so only paths the caller explicitly specified are ever inspected,
//! and fields present only in the current record are never reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::canonical_key;

/// Dotted paths whose list values are compared with order significance.
///
/// Lists at any other path are compared as multisets: elements are sorted by
/// their canonical key before comparison, so `["b", "a"]` equals
/// `["a", "b"]`.
#[derive(Debug, Clone, Default)]
pub struct OrderedPaths(HashSet<String>);

impl OrderedPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

impl<S: Into<String>> FromIterator<S> for OrderedPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// A before/after diff limited to the paths the caller specified.
///
/// `before` holds the prior values of changed paths (null where the path was
/// absent), `after` the desired values. An all-new resource diffs as
/// `{before: {}, after: desired}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub before: Value,
    pub after: Value,
}

impl ChangeSet {
    /// The diff reported for a resource that does not exist yet.
    pub fn creation(desired: &Map<String, Value>) -> Self {
        Self {
            before: Value::Object(Map::new()),
            after: Value::Object(desired.clone()),
        }
    }
}

/// Compute the desired-only subset diff, or `None` when `current` already
/// satisfies every path of `desired`.
///
/// Where a path differs, the raw desired value is reported (not its
/// canonical form).
pub fn subset_diff(current: &Value, desired: &Value, ordered: &OrderedPaths) -> Option<Value> {
    subset_at(Some(current), desired, "", ordered)
}

fn subset_at(
    current: Option<&Value>,
    desired: &Value,
    path: &str,
    ordered: &OrderedPaths,
) -> Option<Value> {
    match desired {
        Value::Object(want) => {
            let have = current.and_then(Value::as_object);
            let mut diff = Map::new();
            for (k, v) in want {
                let child_path = join_path(path, k);
                if let Some(sub) =
                    subset_at(have.and_then(|m| m.get(k)), v, &child_path, ordered)
                {
                    diff.insert(k.clone(), sub);
                }
            }
            (!diff.is_empty()).then_some(Value::Object(diff))
        }
        Value::Array(want) => {
            let equal = current
                .and_then(Value::as_array)
                .is_some_and(|have| lists_equal(have, want, ordered.contains(path)));
            (!equal).then(|| desired.clone())
        }
        scalar => (current != Some(scalar)).then(|| scalar.clone()),
    }
}

/// Compute the before/after diff, or `None` when nothing differs.
///
/// Same recursion and list semantics as [`subset_diff`]; on a difference the
/// raw current and raw desired values are reported for readability.
pub fn build_before_after(
    current: &Value,
    desired: &Value,
    ordered: &OrderedPaths,
) -> Option<ChangeSet> {
    before_after_at(Some(current), desired, "", ordered).map(|(before, after)| ChangeSet {
        before,
        after,
    })
}

fn before_after_at(
    current: Option<&Value>,
    desired: &Value,
    path: &str,
    ordered: &OrderedPaths,
) -> Option<(Value, Value)> {
    match desired {
        Value::Object(want) => {
            let have = current.and_then(Value::as_object);
            let mut before = Map::new();
            let mut after = Map::new();
            for (k, v) in want {
                let child_path = join_path(path, k);
                if let Some((b, a)) =
                    before_after_at(have.and_then(|m| m.get(k)), v, &child_path, ordered)
                {
                    before.insert(k.clone(), b);
                    after.insert(k.clone(), a);
                }
            }
            (!after.is_empty()).then_some((Value::Object(before), Value::Object(after)))
        }
        Value::Array(want) => {
            let equal = current
                .and_then(Value::as_array)
                .is_some_and(|have| lists_equal(have, want, ordered.contains(path)));
            (!equal).then(|| (current.cloned().unwrap_or(Value::Null), desired.clone()))
        }
        scalar => (current != Some(scalar))
            .then(|| (current.cloned().unwrap_or(Value::Null), scalar.clone())),
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

/// Compare two lists, order-sensitively or as multisets.
///
/// Both sides are reduced to canonical element keys first, so nested map
/// key order never influences the result.
fn lists_equal(current: &[Value], desired: &[Value], ordered: bool) -> bool {
    if current.len() != desired.len() {
        return false;
    }
    let mut have: Vec<String> = current.iter().map(canonical_key).collect();
    let mut want: Vec<String> = desired.iter().map(canonical_key).collect();
    if !ordered {
        have.sort();
        want.sort();
    }
    have == want
}
