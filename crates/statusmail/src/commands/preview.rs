//! `preview`: validate and render a report without sending it.

use statusmail_config::Config;
use statusmail_core::{Mailer, Notifier};

use crate::cli::{GlobalOpts, ReportArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(args: &ReportArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let report = util::read_report(&args.file)?;

    // Rendering never touches the transport.
    let notifier = Notifier::new(cfg.notifier_config()?, Mailer::Disabled)?;
    let email = notifier.compose(&report)?;
    let message = notifier.message(&email);

    let out = output::render_single(
        global.output,
        &message,
        |m| m.html.clone(),
        |m| m.subject.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
