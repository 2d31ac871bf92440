//! Idempotent reconciliation of a single resource toward a target state.
//!
//! The state machine is generic: everything vendor-specific about request
//! shapes (batch envelopes, id-list delete bodies, URL templates) is
//! supplied by the caller through [`RequestShape`] and treated as opaque.
//! At most one network mutation is issued per call, and none at all when
//! the remote already satisfies the desired subset.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use nce_api::{NbiClient, Record, paging};

use crate::diff::{ChangeSet, OrderedPaths, build_before_after};
use crate::error::CoreError;
use crate::matcher::{self, MatchPolicy};
use crate::value::{READONLY_KEYS, deep_merge, prune_record, strip_readonly};

/// Target state for a reconciled resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Present,
    Absent,
}

/// Vendor-specific request construction for one collection.
///
/// The reconciler decides *whether* to create, update, or delete; the shape
/// decides *how* — which path, and how the payload is wrapped.
pub trait RequestShape: Send + Sync {
    /// Path + payload for creating `desired`.
    fn create(&self, collection: &str, desired: &Record) -> (String, Value);

    /// Path + payload for updating the record with `id` to `payload`.
    fn update(&self, collection: &str, id: &str, payload: &Record) -> (String, Value);

    /// Path + optional body for deleting the record with `id`.
    fn delete(&self, collection: &str, id: &str) -> (String, Option<Value>);
}

/// Static description of a reconcilable collection.
pub struct ResourceSpec {
    /// Human name used in errors and logs ("site", "device").
    pub kind: &'static str,
    /// Collection path, e.g. `/controller/campus/v3/sites`.
    pub collection: &'static str,
    /// Field carrying the server-assigned identifier.
    pub id_key: &'static str,
    /// Request construction policy.
    pub shape: &'static dyn RequestShape,
}

impl std::fmt::Debug for ResourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSpec")
            .field("kind", &self.kind)
            .field("collection", &self.collection)
            .field("id_key", &self.id_key)
            .finish_non_exhaustive()
    }
}

/// Canonical result shape of every reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Whether a mutation was performed (or, in dry-run, would be).
    pub changed: bool,
    /// Before/after diff of the paths that differed, when any did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<ChangeSet>,
    /// The resulting object (stripped of read-only fields) when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The pre-existing record, as fetched, for context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Record>,
}

/// One reconciliation request: desired object + selector + target state.
#[derive(Debug)]
pub struct ReconcileRequest<'a> {
    pub resource: &'a ResourceSpec,
    /// Business-key mapping locating the resource; may include `name` for
    /// rename scenarios. Empty means "locate by `desired.name`".
    pub selector: Record,
    /// Partial target state. Must carry a non-empty `name`.
    pub desired: Record,
    pub state: State,
    /// Report what would change without mutating anything.
    pub dry_run: bool,
    pub policy: MatchPolicy,
    pub ordered_paths: OrderedPaths,
    pub page_size: u32,
}

impl<'a> ReconcileRequest<'a> {
    pub fn new(resource: &'a ResourceSpec, selector: Record, desired: Record, state: State) -> Self {
        Self {
            resource,
            selector,
            desired,
            state,
            dry_run: false,
            policy: MatchPolicy::default(),
            ordered_paths: OrderedPaths::default(),
            page_size: paging::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ordered_paths(mut self, ordered_paths: OrderedPaths) -> Self {
        self.ordered_paths = ordered_paths;
        self
    }
}

/// Drive `collection` toward the requested state, idempotently.
///
/// Locates the current record via unique-or-fail matching, diffs it against
/// the desired subset, and issues at most one create/update/delete call.
/// See the crate docs for the exact transition table.
pub async fn reconcile(
    client: &NbiClient,
    req: ReconcileRequest<'_>,
) -> Result<Outcome, CoreError> {
    let selector = prune_record(&req.selector);
    let desired = prune_record(&req.desired);

    let name = desired
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or(CoreError::MissingName)?
        .to_owned();

    let filters = matcher::name_filter(&selector, Some(&name));
    let stream = paging::paged(client, req.resource.collection, &filters, req.page_size);
    let current = matcher::find_unique(stream, &selector, Some(&name), req.policy).await?;

    match req.state {
        State::Absent => reconcile_absent(client, &req, current).await,
        State::Present => reconcile_present(client, &req, &desired, current).await,
    }
}

async fn reconcile_absent(
    client: &NbiClient,
    req: &ReconcileRequest<'_>,
    current: Option<Record>,
) -> Result<Outcome, CoreError> {
    let Some(current) = current else {
        debug!(kind = req.resource.kind, "already absent");
        return Ok(Outcome {
            changed: false,
            diff: None,
            result: None,
            current: None,
        });
    };

    if req.dry_run {
        let stripped = strip_readonly(&Value::Object(current.clone()), READONLY_KEYS);
        return Ok(Outcome {
            changed: true,
            diff: None,
            result: Some(stripped),
            current: Some(current),
        });
    }

    let id = record_id(&current, req.resource)?;
    let (path, body) = req.resource.shape.delete(req.resource.collection, &id);
    debug!(kind = req.resource.kind, %id, "deleting");

    match client.delete::<Value>(&path, body.as_ref()).await {
        Ok(_) => Ok(Outcome {
            changed: true,
            diff: None,
            result: None,
            current: Some(current),
        }),
        // Vanished between lookup and delete: already satisfied.
        Err(e) if e.is_not_found() => Ok(Outcome {
            changed: false,
            diff: None,
            result: None,
            current: Some(current),
        }),
        Err(e) => Err(e.into()),
    }
}

async fn reconcile_present(
    client: &NbiClient,
    req: &ReconcileRequest<'_>,
    desired: &Record,
    current: Option<Record>,
) -> Result<Outcome, CoreError> {
    let Some(current) = current else {
        let diff = ChangeSet::creation(desired);
        if req.dry_run {
            return Ok(Outcome {
                changed: true,
                diff: Some(diff),
                result: None,
                current: None,
            });
        }

        let (path, payload) = req.resource.shape.create(req.resource.collection, desired);
        debug!(kind = req.resource.kind, "creating");
        let created: Value = client.post(&path, &payload).await?;

        return Ok(Outcome {
            changed: true,
            diff: Some(diff),
            result: Some(strip_readonly(&created, READONLY_KEYS)),
            current: None,
        });
    };

    let current_stripped = strip_readonly(&Value::Object(current.clone()), READONLY_KEYS);
    let desired_value = Value::Object(desired.clone());

    let Some(diff) = build_before_after(&current_stripped, &desired_value, &req.ordered_paths)
    else {
        debug!(kind = req.resource.kind, "in sync");
        return Ok(Outcome {
            changed: false,
            diff: None,
            result: Some(current_stripped),
            current: Some(current),
        });
    };

    if req.dry_run {
        return Ok(Outcome {
            changed: true,
            diff: Some(diff),
            result: Some(current_stripped),
            current: Some(current),
        });
    }

    // Desired wins on specified paths; everything else keeps its current value.
    let merged_record = match deep_merge(&current_stripped, &desired_value) {
        Value::Object(map) => map,
        // merging two objects always yields an object
        _ => desired.clone(),
    };

    let id = record_id(&current, req.resource)?;
    let (path, payload) = req
        .resource
        .shape
        .update(req.resource.collection, &id, &merged_record);
    debug!(kind = req.resource.kind, %id, "updating");
    let updated: Value = client.put(&path, &payload).await?;

    Ok(Outcome {
        changed: true,
        diff: Some(diff),
        result: Some(strip_readonly(&updated, READONLY_KEYS)),
        current: Some(current),
    })
}

fn record_id(record: &Record, resource: &ResourceSpec) -> Result<String, CoreError> {
    record
        .get(resource.id_key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(CoreError::MissingId {
            kind: resource.kind,
            id_key: resource.id_key,
        })
}
