// Generic paged fetcher for list endpoints.
//
// Turns `GET {collection}?pageIndex=N&pageSize=M` into a lazy stream of
// records. Pages are fetched only as the consumer polls; dropping the
// stream early (first-match lookups) fetches nothing further.

use async_stream::try_stream;
use futures_core::Stream;
use serde_json::Value;
use tracing::warn;

use crate::client::NbiClient;
use crate::error::Error;
use crate::types::Record;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Safety cap on page fetches, guaranteeing termination against a
/// misbehaving or looping remote pager.
pub const MAX_PAGES: u32 = 1000;

/// Envelope keys probed, in order, for the item container of a list
/// response. Collections disagree on the wrapper (`data` for devices,
/// `sites` for sites, `list`/`items` elsewhere).
const EXTRACT_KEYS: &[&str] = &["data", "list", "sites", "items"];

/// Lazily iterate a paginated collection.
///
/// `filters` are passed through as query parameters on every page (e.g. a
/// server-side `name` filter). Iteration ends on an empty page, a short
/// page, or [`MAX_PAGES`].
pub fn paged<'a>(
    client: &'a NbiClient,
    path: &'a str,
    filters: &'a [(String, String)],
    page_size: u32,
) -> impl Stream<Item = Result<Record, Error>> + 'a {
    try_stream! {
        let page_len = usize::try_from(page_size).unwrap_or(usize::MAX);

        for page_index in 0..MAX_PAGES {
            let mut params: Vec<(&str, String)> = vec![
                ("pageIndex", page_index.to_string()),
                ("pageSize", page_size.to_string()),
            ];
            for (k, v) in filters {
                params.push((k.as_str(), v.clone()));
            }

            let page: Value = client.get(path, &params).await?;
            let items = extract_items(page);
            if items.is_empty() {
                break;
            }

            let received = items.len();
            for item in items {
                match item {
                    Value::Object(record) => yield record,
                    other => warn!("skipping non-object item in {path}: {other}"),
                }
            }

            if received < page_len {
                break;
            }
        }
    }
}

/// Dig the item list out of a page envelope.
///
/// Probes [`EXTRACT_KEYS`] on the top-level object, then unwraps one more
/// `{list|data|items}` nesting level. A bare array response is used as-is;
/// a single object is treated as a one-item list.
fn extract_items(page: Value) -> Vec<Value> {
    let container = if let Value::Object(ref obj) = page {
        let found = EXTRACT_KEYS
            .iter()
            .find_map(|k| obj.get(*k))
            .filter(|v| v.is_array() || v.is_object());
        match found {
            Some(v) => v.clone(),
            None => page,
        }
    } else {
        page
    };

    let items = match container {
        Value::Object(ref inner) => ["list", "data", "items"]
            .iter()
            .find_map(|k| inner.get(*k))
            .cloned()
            .unwrap_or(Value::Array(Vec::new())),
        other => other,
    };

    match items {
        Value::Array(arr) => arr,
        Value::Null => Vec::new(),
        single => vec![single],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::extract_items;

    #[test]
    fn data_array_envelope() {
        let page = json!({"data": [{"id": "a"}, {"id": "b"}], "totalRecords": 2});
        assert_eq!(extract_items(page).len(), 2);
    }

    #[test]
    fn sites_envelope() {
        let page = json!({"sites": [{"id": "a"}], "totalRecords": 1});
        assert_eq!(extract_items(page).len(), 1);
    }

    #[test]
    fn nested_list_envelope() {
        let page = json!({"data": {"list": [{"id": "a"}], "pagination": {"totalSize": 1}}});
        assert_eq!(extract_items(page).len(), 1);
    }

    #[test]
    fn bare_array_response() {
        let page = json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]);
        assert_eq!(extract_items(page).len(), 3);
    }

    #[test]
    fn empty_envelope() {
        assert!(extract_items(json!({"data": []})).is_empty());
        assert!(extract_items(json!({})).is_empty());
    }
}
