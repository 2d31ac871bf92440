//! Site command handlers.

use tabled::Tabled;

use nce_core::{Record, resource};

use crate::cli::{GlobalOpts, SitesArgs};
use crate::error::CliError;

use super::{resources, util};

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn to_row(record: &Record) -> SiteRow {
    SiteRow {
        name: util::field(record, "name"),
        id: util::field(record, "id"),
        address: util::field(record, "address"),
        description: util::field(record, "description"),
    }
}

pub async fn handle(args: SitesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    resources::handle(&resource::SITES, args.command, global, to_row).await
}
