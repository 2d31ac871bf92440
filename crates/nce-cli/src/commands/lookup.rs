//! Look up one resource by name or id.

use nce_api::paging;
use nce_core::{resolve, resource};

use crate::cli::{GlobalOpts, LookupArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: LookupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let spec = resource::by_kind(&args.resource)?;
    let client = util::connect(global).await?;

    let record = resolve::lookup_by_identifier(
        &client,
        spec,
        &args.identifier,
        paging::DEFAULT_PAGE_SIZE,
    )
    .await?
    .ok_or_else(|| CliError::NotFound {
        resource_type: spec.kind.to_owned(),
        identifier: args.identifier.clone(),
    })?;

    let out = output::render_single(&global.output, &record, util::record_detail, |r| {
        util::field(r, "id")
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
