//! Device command handlers.

use tabled::Tabled;

use nce_core::{Record, resource};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;

use super::{resources, util};

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "ESN")]
    esn: String,
    #[tabled(rename = "TYPE")]
    device_type: String,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "SITE")]
    site_id: String,
}

fn to_row(record: &Record) -> DeviceRow {
    DeviceRow {
        name: util::field(record, "name"),
        id: util::field(record, "id"),
        esn: util::field(record, "esn"),
        device_type: util::field(record, "type"),
        model: util::field(record, "model"),
        site_id: util::field(record, "siteId"),
    }
}

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    resources::handle(&resource::DEVICES, args.command, global, to_row).await
}
