//! Device inventory rendering.

use nce_api::paging;
use nce_core::{Inventory, build_inventory};

use crate::cli::{GlobalOpts, InventoryArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: InventoryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = util::connect(global).await?;

    let inventory =
        build_inventory(&client, &args.site_ids, paging::DEFAULT_PAGE_SIZE).await?;

    let out = output::render_single(&global.output, &inventory, detail, |inv| {
        inv.hosts.keys().cloned().collect::<Vec<_>>().join("\n")
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(inventory: &Inventory) -> String {
    inventory
        .hosts
        .iter()
        .map(|(name, device)| format!("{name}  site={}", util::field(device, "siteId")))
        .collect::<Vec<_>>()
        .join("\n")
}
