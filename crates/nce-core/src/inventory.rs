//! Device inventory builder.
//!
//! Walks the device collection and produces one host entry per device,
//! keyed by name (id fallback), carrying the raw record. The CLI renders
//! this as JSON or YAML for consumption by provisioning tooling.

use std::collections::BTreeMap;

use futures_util::{StreamExt, pin_mut};
use serde::Serialize;
use serde_json::Value;

use nce_api::{NbiClient, Record, paging};

use crate::error::CoreError;
use crate::resource;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    /// Host name -> raw device record.
    pub hosts: BTreeMap<String, Record>,
}

/// Build the inventory, optionally restricted to the given site ids.
///
/// Devices without a `name` fall back to their `id`; records with neither
/// are skipped.
pub async fn build_inventory(
    client: &NbiClient,
    site_ids: &[String],
    page_size: u32,
) -> Result<Inventory, CoreError> {
    let stream = paging::paged(client, resource::DEVICES.collection, &[], page_size);
    pin_mut!(stream);

    let mut hosts = BTreeMap::new();
    while let Some(device) = stream.next().await {
        let device = device?;

        if !site_ids.is_empty() {
            let in_scope = device
                .get("siteId")
                .and_then(Value::as_str)
                .is_some_and(|s| site_ids.iter().any(|want| want == s));
            if !in_scope {
                continue;
            }
        }

        let name = device
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .or_else(|| device.get("id").and_then(Value::as_str));
        let Some(name) = name.map(str::to_owned) else {
            continue;
        };

        hosts.insert(name, device);
    }

    Ok(Inventory { hosts })
}
