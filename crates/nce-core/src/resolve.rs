//! Business-identity resolution over fetched records.
//!
//! Unlike the reconciler's matcher, the resolver serves human lookup input:
//! `where` keys may be dotted paths into nested mappings, and comparison is
//! string-coerced and case-insensitive. Documented policy — see DESIGN.md.

use futures_util::{StreamExt, pin_mut};
use serde_json::Value;
use std::collections::HashSet;

use nce_api::{NbiClient, Record, paging};

use crate::error::CoreError;
use crate::reconcile::ResourceSpec;

/// Walk a dotted path (`"address.city"`) into a record.
pub fn lookup_path<'v>(record: &'v Record, path: &str) -> Option<&'v Value> {
    let mut segments = path.split('.');
    let mut value = record.get(segments.next()?)?;
    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    text(a).to_lowercase() == text(b).to_lowercase()
}

/// Find exactly one record satisfying every `criteria` pair.
///
/// `unique_by` optionally collapses matches that agree on the listed fields
/// before the uniqueness check (useful when the remote returns duplicate
/// rows for one logical object). Zero matches and residual multiples are
/// both errors.
pub fn resolve_unique<'r>(
    records: &'r [Record],
    criteria: &Record,
    unique_by: &[String],
) -> Result<&'r Record, CoreError> {
    let mut matches: Vec<&Record> = records
        .iter()
        .filter(|r| {
            criteria
                .iter()
                .all(|(k, v)| lookup_path(r, k).is_some_and(|rv| loose_eq(rv, v)))
        })
        .collect();

    if !unique_by.is_empty() {
        let mut seen = HashSet::new();
        matches.retain(|r| {
            let key: Vec<String> = unique_by
                .iter()
                .map(|f| r.get(f).map_or_else(|| "null".to_owned(), |v| text(v).to_lowercase()))
                .collect();
            seen.insert(key)
        });
    }

    match matches.len() {
        0 => Err(CoreError::ResolveNoMatch),
        1 => Ok(matches[0]),
        count => Err(CoreError::ResolveAmbiguous { count }),
    }
}

/// Fetch every record of a collection (all pages).
pub async fn fetch_all(
    client: &NbiClient,
    resource: &ResourceSpec,
    page_size: u32,
) -> Result<Vec<Record>, CoreError> {
    let stream = paging::paged(client, resource.collection, &[], page_size);
    pin_mut!(stream);
    let mut records = Vec::new();
    while let Some(record) = stream.next().await {
        records.push(record?);
    }
    Ok(records)
}

/// Fetch a collection and resolve one record by criteria.
pub async fn resolve_resource(
    client: &NbiClient,
    resource: &ResourceSpec,
    criteria: &Record,
    unique_by: &[String],
) -> Result<Record, CoreError> {
    let records = fetch_all(client, resource, paging::DEFAULT_PAGE_SIZE).await?;
    resolve_unique(&records, criteria, unique_by).cloned()
}

/// First record whose `name` or `id` equals `identifier`.
///
/// The identifier is also passed as a server-side `name` filter to narrow
/// the fetch; equality is still checked client-side. Stops paging at the
/// first hit.
pub async fn lookup_by_identifier(
    client: &NbiClient,
    resource: &ResourceSpec,
    identifier: &str,
    page_size: u32,
) -> Result<Option<Record>, CoreError> {
    let filters = vec![("name".to_owned(), identifier.to_owned())];
    let stream = paging::paged(client, resource.collection, &filters, page_size);
    pin_mut!(stream);

    while let Some(record) = stream.next().await {
        let record = record?;
        let hit = record.get("name").and_then(Value::as_str) == Some(identifier)
            || record.get("id").and_then(Value::as_str) == Some(identifier);
        if hit {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use nce_api::Record;

    use super::{lookup_path, resolve_unique};
    use crate::error::CoreError;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().expect("object").clone()
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let r = record(json!({"address": {"city": "Beauvais"}}));
        assert_eq!(
            lookup_path(&r, "address.city"),
            Some(&json!("Beauvais"))
        );
        assert_eq!(lookup_path(&r, "address.street"), None);
        assert_eq!(lookup_path(&r, "missing.path"), None);
    }

    #[test]
    fn criteria_compare_case_insensitively() {
        let records = vec![
            record(json!({"name": "SW-Edge-01", "address": {"city": "Beauvais"}})),
            record(json!({"name": "SW-Edge-02", "address": {"city": "Creil"}})),
        ];
        let criteria = record(json!({"address.city": "BEAUVAIS"}));
        let hit = resolve_unique(&records, &criteria, &[]).expect("unique");
        assert_eq!(hit["name"], "SW-Edge-01");
    }

    #[test]
    fn numbers_coerce_to_text() {
        let records = vec![record(json!({"vlan": 30}))];
        let criteria = record(json!({"vlan": "30"}));
        assert!(resolve_unique(&records, &criteria, &[]).is_ok());
    }

    #[test]
    fn zero_and_multiple_matches_are_errors() {
        let records = vec![
            record(json!({"city": "X"})),
            record(json!({"city": "X"})),
        ];

        let nothing = record(json!({"city": "Y"}));
        assert!(matches!(
            resolve_unique(&records, &nothing, &[]),
            Err(CoreError::ResolveNoMatch)
        ));

        let both = record(json!({"city": "X"}));
        assert!(matches!(
            resolve_unique(&records, &both, &[]),
            Err(CoreError::ResolveAmbiguous { count: 2 })
        ));
    }

    #[test]
    fn unique_by_collapses_duplicate_rows() {
        let records = vec![
            record(json!({"name": "sw1", "city": "X"})),
            record(json!({"name": "SW1", "city": "X"})),
        ];
        let criteria = record(json!({"city": "x"}));
        let unique_by = vec!["name".to_owned()];
        let hit = resolve_unique(&records, &criteria, &unique_by).expect("collapsed");
        assert_eq!(hit["name"], "sw1");
    }
}
