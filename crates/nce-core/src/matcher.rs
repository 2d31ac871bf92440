//! Selector matching over a lazy record stream.
//!
//! A non-empty selector matches a record when every selector pair equals the
//! record's corresponding field; with an empty selector the `name` fallback
//! is used. Matching is always applied client-side: a server-side `name`
//! filter (see [`name_filter`]) only narrows the fetch, since remote filters
//! may be case-insensitive or prefix-based.

use futures_core::Stream;
use futures_util::{StreamExt, pin_mut};
use serde_json::{Map, Value};

use nce_api::Record;

use crate::error::CoreError;

/// Maximum number of records included in an ambiguity error.
pub const PREVIEW_LIMIT: usize = 5;

/// Identity fields projected into ambiguity previews.
const PREVIEW_KEYS: &[&str] = &["id", "name", "city", "timezone"];

/// Equality policy for selector and name matching.
///
/// The vendor's business keys (organization names, addresses, ids) are
/// treated as exact values by default; case-insensitive matching is opt-in
/// for deployments that normalize them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl MatchPolicy {
    fn values_equal(self, a: &Value, b: &Value) -> bool {
        match (self, a, b) {
            (Self::CaseInsensitive, Value::String(x), Value::String(y)) => {
                x.eq_ignore_ascii_case(y)
            }
            _ => a == b,
        }
    }

    fn strs_equal(self, a: &str, b: &str) -> bool {
        match self {
            Self::CaseSensitive => a == b,
            Self::CaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Does `record` match the selector (or, with an empty selector, the name
/// fallback)? A non-empty selector ignores the fallback entirely.
pub fn record_matches(
    record: &Record,
    selector: &Record,
    name_fallback: Option<&str>,
    policy: MatchPolicy,
) -> bool {
    if !selector.is_empty() {
        return selector
            .iter()
            .all(|(k, v)| record.get(k).is_some_and(|rv| policy.values_equal(rv, v)));
    }
    match name_fallback {
        Some(name) => record
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|n| policy.strs_equal(n, name)),
        None => false,
    }
}

/// Server-side filter parameters for the fetch backing a match.
///
/// Only the name fallback can be pushed down; selectors are arbitrary
/// business keys the list endpoints don't filter on. An optimization, not a
/// correctness requirement.
pub fn name_filter(selector: &Record, name_fallback: Option<&str>) -> Vec<(String, String)> {
    if selector.is_empty() {
        name_fallback
            .map(|n| vec![("name".to_owned(), n.to_owned())])
            .unwrap_or_default()
    } else {
        Vec::new()
    }
}

/// First matching record, consuming no more of the stream than needed.
///
/// Used when uniqueness is assumed; remaining pages are never fetched.
pub async fn find_first<S>(
    records: S,
    selector: &Record,
    name_fallback: Option<&str>,
    policy: MatchPolicy,
) -> Result<Option<Record>, CoreError>
where
    S: Stream<Item = Result<Record, nce_api::Error>>,
{
    pin_mut!(records);
    while let Some(record) = records.next().await {
        let record = record?;
        if record_matches(&record, selector, name_fallback, policy) {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

/// Every matching record; drains the full stream.
pub async fn find_candidates<S>(
    records: S,
    selector: &Record,
    name_fallback: Option<&str>,
    policy: MatchPolicy,
) -> Result<Vec<Record>, CoreError>
where
    S: Stream<Item = Result<Record, nce_api::Error>>,
{
    pin_mut!(records);
    let mut matches = Vec::new();
    while let Some(record) = records.next().await {
        let record = record?;
        if record_matches(&record, selector, name_fallback, policy) {
            matches.push(record);
        }
    }
    Ok(matches)
}

/// Unique match or `None`; more than one match is an ambiguity error with a
/// bounded preview.
pub async fn find_unique<S>(
    records: S,
    selector: &Record,
    name_fallback: Option<&str>,
    policy: MatchPolicy,
) -> Result<Option<Record>, CoreError>
where
    S: Stream<Item = Result<Record, nce_api::Error>>,
{
    let mut candidates = find_candidates(records, selector, name_fallback, policy).await?;
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        count => Err(CoreError::AmbiguousMatch {
            count,
            preview: preview(&candidates),
        }),
    }
}

fn preview(candidates: &[Record]) -> Vec<Record> {
    candidates
        .iter()
        .take(PREVIEW_LIMIT)
        .map(|record| {
            let mut projected = Map::new();
            for key in PREVIEW_KEYS {
                if let Some(v) = record.get(*key) {
                    projected.insert((*key).to_owned(), v.clone());
                }
            }
            projected
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use serde_json::json;

    use nce_api::Record;

    use super::{MatchPolicy, find_first, find_unique, name_filter, record_matches};
    use crate::error::CoreError;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().expect("object").clone()
    }

    fn ok_stream(
        records: Vec<Record>,
    ) -> impl futures_core::Stream<Item = Result<Record, nce_api::Error>> {
        stream::iter(records.into_iter().map(Ok))
    }

    #[test]
    fn selector_ignores_name_fallback() {
        let r = record(json!({"name": "other", "city": "X"}));
        let selector = record(json!({"city": "X"}));
        assert!(record_matches(
            &r,
            &selector,
            Some("ignored"),
            MatchPolicy::CaseSensitive
        ));

        let r2 = record(json!({"name": "ignored", "city": "Y"}));
        assert!(!record_matches(
            &r2,
            &selector,
            Some("ignored"),
            MatchPolicy::CaseSensitive
        ));
    }

    #[test]
    fn empty_selector_falls_back_to_name() {
        let r = record(json!({"name": "site1"}));
        let empty = Record::new();
        assert!(record_matches(
            &r,
            &empty,
            Some("site1"),
            MatchPolicy::CaseSensitive
        ));
        assert!(!record_matches(
            &r,
            &empty,
            Some("SITE1"),
            MatchPolicy::CaseSensitive
        ));
        assert!(record_matches(
            &r,
            &empty,
            Some("SITE1"),
            MatchPolicy::CaseInsensitive
        ));
    }

    #[test]
    fn name_filter_only_without_selector() {
        let empty = Record::new();
        assert_eq!(
            name_filter(&empty, Some("s1")),
            vec![("name".to_owned(), "s1".to_owned())]
        );

        let selector = record(json!({"city": "X"}));
        assert!(name_filter(&selector, Some("s1")).is_empty());
    }

    #[tokio::test]
    async fn find_first_stops_at_first_match() {
        let records = vec![
            record(json!({"name": "a"})),
            record(json!({"name": "b"})),
            record(json!({"name": "b", "id": "second"})),
        ];
        let found = find_first(
            ok_stream(records),
            &Record::new(),
            Some("b"),
            MatchPolicy::CaseSensitive,
        )
        .await
        .expect("stream ok");
        let found = found.expect("match");
        assert!(!found.contains_key("id"));
    }

    #[tokio::test]
    async fn find_unique_flags_ambiguity_with_bounded_preview() {
        let selector = record(json!({"city": "X"}));
        let records = vec![
            record(json!({"id": "1", "name": "a", "city": "X", "secret": "s1"})),
            record(json!({"id": "2", "name": "b", "city": "X", "secret": "s2"})),
            record(json!({"id": "3", "name": "c", "city": "X", "secret": "s3"})),
        ];

        let err = find_unique(
            ok_stream(records),
            &selector,
            None,
            MatchPolicy::CaseSensitive,
        )
        .await
        .expect_err("ambiguous");

        match err {
            CoreError::AmbiguousMatch { count, preview } => {
                assert_eq!(count, 3);
                assert_eq!(preview.len(), 3);
                // projection keeps identity fields only
                assert!(preview.iter().all(|p| !p.contains_key("secret")));
                assert_eq!(preview[0]["id"], "1");
            }
            other => panic!("expected AmbiguousMatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn find_unique_preview_is_capped_at_five() {
        let selector = record(json!({"city": "X"}));
        let records: Vec<Record> = (0..8)
            .map(|i| record(json!({"id": i.to_string(), "city": "X"})))
            .collect();

        let err = find_unique(
            ok_stream(records),
            &selector,
            None,
            MatchPolicy::CaseSensitive,
        )
        .await
        .expect_err("ambiguous");

        match err {
            CoreError::AmbiguousMatch { count, preview } => {
                assert_eq!(count, 8);
                assert_eq!(preview.len(), 5);
            }
            other => panic!("expected AmbiguousMatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn find_unique_none_when_nothing_matches() {
        let found = find_unique(
            ok_stream(vec![record(json!({"name": "a"}))]),
            &Record::new(),
            Some("missing"),
            MatchPolicy::CaseSensitive,
        )
        .await
        .expect("stream ok");
        assert!(found.is_none());
    }
}
