//! `send`: validate, render and deliver a report from the command line.

use statusmail_config::Config;
use statusmail_core::{Delivered, Mailer, Notifier};

use crate::cli::{GlobalOpts, ReportArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: &ReportArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let report = util::read_report(&args.file)?;

    let mailer = Mailer::from_config(&cfg.mailer_config()?)?;
    if mailer.is_disabled() && !global.quiet {
        eprintln!("mail transport is disabled; the report will be logged, not sent");
    }

    let notifier = Notifier::new(cfg.notifier_config()?, mailer)?;
    let delivered = notifier.notify(&report).await?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &delivered,
        |d| detail(d, color),
        |d| d.message_id.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(d: &Delivered, color: bool) -> String {
    let mut lines = vec![
        output::success("Email sent successfully!", color),
        format!(
            "  Status:     {}",
            output::paint_hex(d.status.tag(), d.status.color(), color)
        ),
        format!("  Subject:    {}", d.subject),
        format!("  Recipients: {}", d.recipients.join(", ")),
    ];
    if let Some(ref id) = d.message_id {
        lines.push(format!("  Message ID: {id}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use statusmail_core::IncidentStatus;

    use super::*;

    #[test]
    fn detail_lists_delivery() {
        let d = Delivered {
            status: IncidentStatus::Green,
            subject: "GREEN S1 Outage Communication | VPN".into(),
            recipients: vec!["a@example.com".into(), "b@example.com".into()],
            message_id: Some("msg-7".into()),
        };
        let text = detail(&d, false);
        assert!(text.starts_with("Email sent successfully!"));
        assert!(text.contains("Status:     GREEN"));
        assert!(text.contains("a@example.com, b@example.com"));
        assert!(text.contains("Message ID: msg-7"));
    }
}
