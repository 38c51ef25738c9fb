//! `statuses`: the selectable incident statuses and what each requires.

use statusmail_core::{IncidentStatus, StatusStyle};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Status")]
    tag: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Color")]
    color: &'static str,
    #[tabled(rename = "Outage End")]
    outage_end: &'static str,
    #[tabled(rename = "Incident ID")]
    incident_id: &'static str,
}

fn required(flag: bool) -> &'static str {
    if flag { "required" } else { "optional" }
}

impl From<&StatusStyle> for StatusRow {
    fn from(s: &StatusStyle) -> Self {
        Self {
            tag: s.tag,
            label: s.label,
            color: s.color,
            outage_end: required(s.requires_outage_end),
            incident_id: required(s.requires_incident_id),
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let styles: Vec<StatusStyle> = IncidentStatus::SELECTABLE
        .into_iter()
        .map(|s| *s.style())
        .collect();

    let out = output::render_list(
        global.output,
        &styles,
        |s| StatusRow::from(s),
        |s| s.tag.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
