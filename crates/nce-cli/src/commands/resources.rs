//! Shared verb handlers for the two managed collections.
//!
//! `sites` and `devices` differ only in their table projection and
//! `ResourceSpec`; everything else -- listing, lookup, reconciliation --
//! is collection-agnostic.

use futures_util::{StreamExt, pin_mut};
use serde_json::json;
use tabled::Tabled;

use nce_api::paging;
use nce_core::{
    MatchPolicy, Outcome, OrderedPaths, ReconcileRequest, Record, ResourceSpec, State, reconcile,
    resolve,
};

use crate::cli::{EnsureArgs, GlobalOpts, ResourceCommand, StateArg};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle<R: Tabled>(
    spec: &'static ResourceSpec,
    command: ResourceCommand,
    global: &GlobalOpts,
    to_row: impl Fn(&Record) -> R,
) -> Result<(), CliError> {
    match command {
        ResourceCommand::List { name } => list(spec, name, global, to_row).await,
        ResourceCommand::Get { identifier } => get(spec, &identifier, global).await,
        ResourceCommand::Ensure(args) => ensure(spec, args, global).await,
        ResourceCommand::Delete {
            name,
            selector,
            dry_run,
        } => delete(spec, name, selector, dry_run, global).await,
    }
}

async fn list<R: Tabled>(
    spec: &'static ResourceSpec,
    name: Option<String>,
    global: &GlobalOpts,
    to_row: impl Fn(&Record) -> R,
) -> Result<(), CliError> {
    let client = util::connect(global).await?;

    let filters: Vec<(String, String)> = name
        .map(|n| vec![("name".to_owned(), n)])
        .unwrap_or_default();

    let stream = paging::paged(&client, spec.collection, &filters, paging::DEFAULT_PAGE_SIZE);
    pin_mut!(stream);
    let mut records: Vec<Record> = Vec::new();
    while let Some(record) = stream.next().await {
        records.push(record?);
    }

    let out = output::render_list(&global.output, &records, to_row, |r| util::field(r, "name"));
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn get(
    spec: &'static ResourceSpec,
    identifier: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = util::connect(global).await?;

    let record =
        resolve::lookup_by_identifier(&client, spec, identifier, paging::DEFAULT_PAGE_SIZE)
            .await?
            .ok_or_else(|| CliError::NotFound {
                resource_type: spec.kind.to_owned(),
                identifier: identifier.to_owned(),
            })?;

    let out = output::render_single(&global.output, &record, util::record_detail, |r| {
        util::field(r, "id")
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn ensure(
    spec: &'static ResourceSpec,
    args: EnsureArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Parse inputs before any network round trip.
    let desired = util::parse_json_arg("object", &args.object)?;
    let selector = match &args.selector {
        Some(raw) => util::parse_json_arg("selector", raw)?,
        None => Record::new(),
    };

    let state = match args.state {
        StateArg::Present => State::Present,
        StateArg::Absent => State::Absent,
    };
    let policy = if args.ignore_case {
        MatchPolicy::CaseInsensitive
    } else {
        MatchPolicy::CaseSensitive
    };

    let client = util::connect(global).await?;

    let request = ReconcileRequest::new(spec, selector, desired, state)
        .dry_run(args.dry_run)
        .policy(policy)
        .ordered_paths(OrderedPaths::new(args.ordered_paths));

    let outcome = reconcile(&client, request).await?;
    report_outcome(spec, &outcome, args.dry_run, global);
    Ok(())
}

async fn delete(
    spec: &'static ResourceSpec,
    name: String,
    selector: Option<String>,
    dry_run: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let selector = match &selector {
        Some(raw) => util::parse_json_arg("selector", raw)?,
        None => Record::new(),
    };

    if !dry_run
        && !util::confirm(
            &format!("Delete {} '{name}'? This is destructive.", spec.kind),
            global.yes,
        )?
    {
        return Ok(());
    }

    let client = util::connect(global).await?;

    let desired: Record = json!({ "name": name })
        .as_object()
        .cloned()
        .unwrap_or_default();
    let request = ReconcileRequest::new(spec, selector, desired, State::Absent).dry_run(dry_run);

    let outcome = reconcile(&client, request).await?;
    report_outcome(spec, &outcome, dry_run, global);
    Ok(())
}

fn report_outcome(spec: &ResourceSpec, outcome: &Outcome, dry_run: bool, global: &GlobalOpts) {
    let out = output::render_single(&global.output, outcome, outcome_detail, |o| {
        o.changed.to_string()
    });
    output::print_output(&out, global.quiet);

    if !global.quiet {
        let verdict = match (outcome.changed, dry_run) {
            (true, true) => "would change",
            (true, false) => "changed",
            (false, _) => "unchanged",
        };
        eprintln!("{} {}", spec.kind, verdict);
    }
}

fn outcome_detail(outcome: &Outcome) -> String {
    let mut lines = vec![format!("changed: {}", outcome.changed)];
    if let Some(diff) = &outcome.diff {
        lines.push(format!("before: {}", output::render_json_compact(&diff.before)));
        lines.push(format!("after: {}", output::render_json_compact(&diff.after)));
    }
    if let Some(result) = &outcome.result {
        lines.push(format!("result: {}", output::render_json_compact(result)));
    }
    lines.join("\n")
}
