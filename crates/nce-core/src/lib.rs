// nce-core: Idempotent reconciliation of NCE-Campus resources.
//
// Sits between nce-api (transport, paging) and consumers (CLI). The core is
// the desired-state vs current-state machinery: value normalization, subset
// and before/after diffing, selector matching, and the reconcile state
// machine, parameterized by per-resource request shapes.

pub mod diff;
pub mod error;
pub mod inventory;
pub mod matcher;
pub mod reconcile;
pub mod resource;
pub mod resolve;
pub mod value;

// ── Primary re-exports ──────────────────────────────────────────────
pub use diff::{ChangeSet, OrderedPaths, build_before_after, subset_diff};
pub use error::CoreError;
pub use inventory::{Inventory, build_inventory};
pub use matcher::MatchPolicy;
pub use reconcile::{Outcome, ReconcileRequest, RequestShape, ResourceSpec, State, reconcile};
pub use value::{READONLY_KEYS, deep_merge, prune, prune_record, strip_readonly};

// Re-export the record alias so callers don't need nce-api for the type.
pub use nce_api::Record;
