use thiserror::Error;

use nce_api::Record;

/// Error taxonomy of the reconciliation core.
///
/// Input and ambiguity errors are fatal and raised before any mutation;
/// transport/API failures bubble up from `nce-api` unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The desired object carried no usable `name`. Required for every
    /// operation (create, update, delete identity-by-name).
    #[error("object name is required for all operations (present/absent)")]
    MissingName,

    /// More than one record matched a selector/name under a uniqueness
    /// requirement. Carries a bounded preview so the caller can refine the
    /// selector without receiving the full payloads.
    #[error(
        "multiple resources match the provided selector/name ({count} matches); \
         refine the selector (it may include 'name' for rename)"
    )]
    AmbiguousMatch {
        count: usize,
        /// At most 5 matches, projected down to identity fields.
        preview: Vec<Record>,
    },

    /// A matched record lacks the id field the collection is keyed by.
    #[error("{kind} record has no usable '{id_key}' field")]
    MissingId {
        kind: &'static str,
        id_key: &'static str,
    },

    /// Resolver criteria matched nothing.
    #[error("no match for resolver criteria")]
    ResolveNoMatch,

    /// Resolver criteria matched more than one distinct record.
    #[error("multiple matches for resolver criteria ({count})")]
    ResolveAmbiguous { count: usize },

    /// Unknown resource kind name.
    #[error("unsupported resource kind: {0}")]
    UnsupportedResource(String),

    /// Transport or API failure from the client layer.
    #[error(transparent)]
    Api(#[from] nce_api::Error),
}
