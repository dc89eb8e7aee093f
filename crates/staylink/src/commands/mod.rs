//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod catalog;
pub mod categories;
pub mod config_cmd;
pub mod housekeeping;
pub mod loyalty;
pub mod markup;
pub mod schedule;
pub mod util;

use staylink_core::Marketplace;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    marketplace: &Marketplace,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Categories(args) => categories::handle(marketplace, args, global).await,
        Command::Markup(args) => markup::handle(marketplace, args, global).await,
        Command::Housekeeping(args) => housekeeping::handle(marketplace, args, global).await,
        Command::Loyalty => loyalty::handle(marketplace, global).await,
        // Local commands are handled before dispatch
        Command::Catalog(_)
        | Command::Schedule(_)
        | Command::Config(_)
        | Command::Completions(_) => unreachable!(),
    }
}
