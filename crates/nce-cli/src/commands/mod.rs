//! Command dispatch.

pub mod auth;
pub mod devices;
pub mod inventory;
pub mod lookup;
pub mod resources;
pub mod sites;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(command: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Auth(args) => auth::handle(args, global).await,
        Command::Sites(args) => sites::handle(args, global).await,
        Command::Devices(args) => devices::handle(args, global).await,
        Command::Lookup(args) => lookup::handle(args, global).await,
        Command::Inventory(args) => inventory::handle(args, global).await,
        // Handled in main before dispatch (needs the clap command factory).
        Command::Completions(_) => Ok(()),
    }
}
