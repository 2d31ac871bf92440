//! Request shapes for the two managed collections.
//!
//! The campus v3 endpoints are asymmetric: creation wraps the object in a
//! batch envelope keyed by the collection's plural name, update is a plain
//! PUT on an id-suffixed path, and deletion carries an id list in the body
//! of a DELETE on the bare collection.

use serde_json::{Value, json};

use nce_api::Record;

use crate::error::CoreError;
use crate::reconcile::{RequestShape, ResourceSpec};

/// `POST {collection}` with `{"sites": [obj]}`; delete by `{"ids": [id]}`.
pub struct SiteShape;

impl RequestShape for SiteShape {
    fn create(&self, collection: &str, desired: &Record) -> (String, Value) {
        (collection.to_owned(), json!({ "sites": [desired] }))
    }

    fn update(&self, collection: &str, id: &str, payload: &Record) -> (String, Value) {
        (format!("{collection}/{id}"), Value::Object(payload.clone()))
    }

    fn delete(&self, collection: &str, id: &str) -> (String, Option<Value>) {
        (collection.to_owned(), Some(json!({ "ids": [id] })))
    }
}

/// `POST {collection}` with `{"devices": [obj]}`; delete by `{"ids": [id]}`.
pub struct DeviceShape;

impl RequestShape for DeviceShape {
    fn create(&self, collection: &str, desired: &Record) -> (String, Value) {
        (collection.to_owned(), json!({ "devices": [desired] }))
    }

    fn update(&self, collection: &str, id: &str, payload: &Record) -> (String, Value) {
        (format!("{collection}/{id}"), Value::Object(payload.clone()))
    }

    fn delete(&self, collection: &str, id: &str) -> (String, Option<Value>) {
        (collection.to_owned(), Some(json!({ "ids": [id] })))
    }
}

/// Site collection descriptor.
pub const SITES: ResourceSpec = ResourceSpec {
    kind: "site",
    collection: "/controller/campus/v3/sites",
    id_key: "id",
    shape: &SiteShape,
};

/// Device collection descriptor.
pub const DEVICES: ResourceSpec = ResourceSpec {
    kind: "device",
    collection: "/controller/campus/v3/devices",
    id_key: "id",
    shape: &DeviceShape,
};

/// Resolve a resource kind name (`sites`/`devices`, singular accepted).
pub fn by_kind(kind: &str) -> Result<&'static ResourceSpec, CoreError> {
    match kind {
        "site" | "sites" => Ok(&SITES),
        "device" | "devices" => Ok(&DEVICES),
        other => Err(CoreError::UnsupportedResource(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use nce_api::Record;

    use super::{DEVICES, SITES, by_kind};

    fn desired() -> Record {
        json!({"name": "S1", "type": ["AP"]})
            .as_object()
            .expect("object")
            .clone()
    }

    #[test]
    fn site_create_uses_batch_envelope() {
        let (path, payload) = SITES.shape.create(SITES.collection, &desired());
        assert_eq!(path, "/controller/campus/v3/sites");
        assert_eq!(payload, json!({"sites": [{"name": "S1", "type": ["AP"]}]}));
    }

    #[test]
    fn site_update_targets_id_path_with_bare_payload() {
        let (path, payload) = SITES.shape.update(SITES.collection, "abc", &desired());
        assert_eq!(path, "/controller/campus/v3/sites/abc");
        assert_eq!(payload, json!({"name": "S1", "type": ["AP"]}));
    }

    #[test]
    fn delete_carries_id_list_body() {
        let (path, body) = DEVICES.shape.delete(DEVICES.collection, "dev-1");
        assert_eq!(path, "/controller/campus/v3/devices");
        assert_eq!(body, Some(json!({"ids": ["dev-1"]})));
    }

    #[test]
    fn kind_lookup_accepts_both_numbers() {
        assert_eq!(by_kind("sites").expect("known").kind, "site");
        assert_eq!(by_kind("device").expect("known").kind, "device");
        assert!(by_kind("vlans").is_err());
    }
}
