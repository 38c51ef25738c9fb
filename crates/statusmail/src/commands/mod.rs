//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod preview;
pub mod send;
pub mod serve;
pub mod statuses;
pub mod util;

use statusmail_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a config-dependent command to its handler.
pub async fn dispatch(cmd: Command, cfg: Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Serve(args) => serve::handle(args, cfg).await,
        Command::Send(args) => send::handle(&args, &cfg, global).await,
        Command::Preview(args) => preview::handle(&args, &cfg, global),
        Command::Statuses => statuses::handle(global),
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Ok(()),
    }
}
