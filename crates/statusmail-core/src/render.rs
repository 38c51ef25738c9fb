// ── Report rendering ──
//
// A validated report becomes a subject line plus one fixed HTML layout.
// The layout is a handlebars template, so every `{{value}}` is escaped;
// the only raw insertion is the chain of events, which is escaped line by
// line here before the `<br>` joins are added.

use handlebars::Handlebars;
use serde::Serialize;
use statusmail_api::MailMessage;

use crate::config::{Branding, Mailbox};
use crate::error::CoreError;
use crate::model::IncidentStatus;
use crate::validate::ValidatedReport;

/// Header carrying the status tag on every outgoing message.
pub const STATUS_HEADER: &str = "X-Incident-Status";

const NOT_AVAILABLE: &str = "N/A";

const REPORT_TEMPLATE: &str = "status-report";

const REPORT_HTML: &str = r#"<div style="font-family: Arial, sans-serif; padding: 20px; background-color: #f4f4f4;">
  <table style="width: 100%; max-width: 600px; margin: auto; background: #fff; border-radius: 8px; box-shadow: 0px 2px 5px #ccc;">
    <tr>
      <td style="background: {{color}}; color: white; padding: 20px; font-size: 22px; text-align: center; font-weight: bold; border-top-left-radius: 8px; border-top-right-radius: 8px;">
        Status - {{tag}}
      </td>
    </tr>
    <tr>
      <td style="padding: 25px; font-size: 18px; line-height: 1.8; color: #333;">
        <p><strong>Current Status:</strong> {{label}}</p>
        <p><strong>Incident Title:</strong> {{incident_title}}</p>
        <p><strong>Description:</strong> {{description}}</p>
        <p><strong>Impact:</strong> {{impact}}</p>
        <p><strong>Outage Start:</strong> {{outage_start}}</p>
        {{#if outage_end}}<p><strong>Outage End:</strong> {{outage_end}}</p>{{/if}}
        <p><strong>Slack Channel:</strong> {{slack_channel}}</p>
        {{#if incident_id}}<p><strong>Incident ID:</strong> {{incident_id}}</p>{{/if}}
        <p><strong>Region:</strong> {{region}}</p>
        <p><strong>Reporter:</strong> {{reporter}}</p>
        {{#if bridge_url}}<p><strong>Bridge:</strong> <a href="{{bridge_url}}" target="_blank" style="color: #007bff;">join call</a></p>{{/if}}
        <p><strong>Major Incident Managers:</strong> {{major_incident_managers}}</p>
        <p><strong>Teams Engaged:</strong> {{teams_engaged}}</p>
        <p><strong>Chain of Events:</strong> <br>{{{chain_of_events}}}</p>
        <hr style="border: 0; border-top: 1px solid #ddd;">
        <p style="color: #999; text-align: center; font-size: 14px;">{{footer}}</p>
      </td>
    </tr>
  </table>
</div>
"#;

/// A rendered status report, not yet addressed from anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub status: IncidentStatus,
    pub recipients: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl RenderedEmail {
    /// Build the relay message, adding the status header.
    pub fn to_message(&self, from: &Mailbox) -> MailMessage {
        MailMessage {
            from: from.to_string(),
            to: self.recipients.clone(),
            subject: self.subject.clone(),
            headers: [(STATUS_HEADER.to_owned(), self.status.tag().to_owned())].into(),
            html: self.html.clone(),
        }
    }
}

#[derive(Serialize)]
struct ReportContext<'a> {
    tag: &'static str,
    label: &'static str,
    color: &'static str,
    incident_title: &'a str,
    description: &'a str,
    impact: &'a str,
    outage_start: &'a str,
    outage_end: Option<&'a str>,
    slack_channel: &'a str,
    incident_id: Option<&'a str>,
    region: &'a str,
    reporter: &'a str,
    bridge_url: Option<&'a str>,
    major_incident_managers: &'a str,
    teams_engaged: String,
    chain_of_events: String,
    footer: &'a str,
}

/// Renders validated reports with fixed branding.
#[derive(Debug)]
pub struct Renderer {
    registry: Handlebars<'static>,
    branding: Branding,
}

impl Renderer {
    pub fn try_new(branding: Branding) -> Result<Self, CoreError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(REPORT_TEMPLATE, REPORT_HTML)?;
        Ok(Self { registry, branding })
    }

    pub fn render(&self, report: &ValidatedReport) -> Result<RenderedEmail, CoreError> {
        let style = report.status.style();
        let bridge_url = report
            .zoom_link
            .as_deref()
            .or(self.branding.bridge_url.as_deref())
            .filter(|url| is_web_link(url));

        let context = ReportContext {
            tag: style.tag,
            label: style.label,
            color: style.color,
            incident_title: &report.incident_title,
            description: &report.description,
            impact: &report.impact,
            outage_start: &report.outage_start,
            outage_end: outage_end_display(report.status, report.outage_end.as_deref()),
            slack_channel: report.slack_channel.as_deref().unwrap_or(NOT_AVAILABLE),
            incident_id: report
                .incident_id
                .as_deref()
                .filter(|_| report.status == IncidentStatus::Green),
            region: &self.branding.region,
            reporter: &self.branding.reporter,
            bridge_url,
            major_incident_managers: &report.major_incident_managers,
            teams_engaged: teams_display(&report.teams_engaged),
            chain_of_events: chain_of_events_html(Some(report.chain_of_events.as_str())),
            footer: &self.branding.footer,
        };

        let html = self.registry.render(REPORT_TEMPLATE, &context)?;

        Ok(RenderedEmail {
            status: report.status,
            recipients: report.recipients.clone(),
            subject: subject_line(report.status, &report.incident_title),
            html,
        })
    }
}

/// `<TAG> S1 Outage Communication | <title>`
pub fn subject_line(status: IncidentStatus, incident_title: &str) -> String {
    format!("{} S1 Outage Communication | {incident_title}", status.tag())
}

/// Value for the Outage End line, or `None` when the line is omitted.
///
/// GREEN without a value omits the line; every other status shows "N/A"
/// in place of a missing value.
pub fn outage_end_display(status: IncidentStatus, outage_end: Option<&str>) -> Option<&str> {
    match (status, outage_end) {
        (_, Some(value)) => Some(value),
        (IncidentStatus::Green, None) => None,
        (_, None) => Some(NOT_AVAILABLE),
    }
}

pub fn teams_display(teams: &[String]) -> String {
    if teams.is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        teams.join(", ")
    }
}

/// Escape each line, then join with `<br>`.
pub fn chain_of_events_html(chain: Option<&str>) -> String {
    match chain {
        Some(text) if !text.trim().is_empty() => text
            .lines()
            .map(handlebars::html_escape)
            .collect::<Vec<_>>()
            .join("<br>"),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn is_web_link(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{IncidentReport, TeamsEngaged};

    fn report(status: &str) -> IncidentReport {
        IncidentReport {
            recipient: Some("oncall@example.com".into()),
            subject: Some("ignored".into()),
            status: Some(status.into()),
            incident_title: Some("Checkout errors".into()),
            description: Some("Elevated 5xx".into()),
            impact: Some("Orders failing".into()),
            outage_start: Some("10:00".into()),
            outage_end: None,
            slack_channel: None,
            incident_id: None,
            zoom_link: None,
            major_incident_managers: Some("A. Rivera".into()),
            teams_engaged: Some(TeamsEngaged::List(vec!["Payments".into(), "SRE".into()])),
            chain_of_events: Some("10:00 alert\n10:05 paged".into()),
        }
    }

    fn render(report: &IncidentReport) -> RenderedEmail {
        let validated = report.validate().expect("valid report");
        Renderer::try_new(Branding::default())
            .expect("template compiles")
            .render(&validated)
            .expect("renders")
    }

    #[test]
    fn green_renders_incident_id() {
        let email = render(&IncidentReport {
            outage_end: Some("11:30".into()),
            incident_id: Some("INC123".into()),
            ..report("GREEN")
        });
        assert!(email.html.contains("INC123"));
        assert!(email.html.contains("Incident ID:"));
        assert!(email.html.contains("Outage End:</strong> 11:30"));
        assert!(email.html.contains("#388e3c"));
        assert_eq!(email.subject, "GREEN S1 Outage Communication | Checkout errors");
    }

    #[test]
    fn red_omits_incident_id_line() {
        let email = render(&IncidentReport {
            incident_id: Some("INC123".into()),
            ..report("RED")
        });
        assert!(!email.html.contains("Incident ID:"));
        assert!(!email.html.contains("INC123"));
        assert!(email.html.contains("Outage End:</strong> N/A"));
        assert!(email.html.contains("Current Status:</strong> Investigating"));
    }

    #[test]
    fn unknown_status_renders_neutral_banner() {
        let email = render(&report("mauve"));
        assert_eq!(email.status, IncidentStatus::Unknown);
        assert!(email.html.contains("Status - UNKNOWN"));
        assert!(email.html.contains("#6c757d"));
        assert!(email.subject.starts_with("UNKNOWN "));
    }

    #[test]
    fn field_values_are_escaped() {
        let email = render(&IncidentReport {
            description: Some("<script>alert(1)</script>".into()),
            chain_of_events: Some("a < b\n<b>bold</b>".into()),
            ..report("RED")
        });
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.html.contains("a &lt; b<br>&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn optional_fields_fall_back_to_na() {
        let email = render(&report("RED"));
        assert!(email.html.contains("Slack Channel:</strong> N/A"));
        assert!(email.html.contains("Teams Engaged:</strong> Payments, SRE"));
        assert!(!email.html.contains("Bridge:"));
    }

    #[test]
    fn report_bridge_link_overrides_branding() {
        let validated = IncidentReport {
            zoom_link: Some("https://meet.example.com/inc".into()),
            ..report("RED")
        }
        .validate()
        .expect("valid");
        let branding = Branding {
            bridge_url: Some("https://meet.example.com/default".into()),
            ..Branding::default()
        };
        let email = Renderer::try_new(branding)
            .expect("template compiles")
            .render(&validated)
            .expect("renders");
        assert!(email.html.contains("https://meet.example.com/inc"));
        assert!(!email.html.contains("/default"));
    }

    #[test]
    fn non_web_bridge_links_are_dropped() {
        let email = render(&IncidentReport {
            zoom_link: Some("javascript:alert(1)".into()),
            ..report("RED")
        });
        assert!(!email.html.contains("Bridge:"));
    }

    #[test]
    fn message_carries_status_header() {
        let email = render(&report("RED"));
        let message = email.to_message(&Mailbox::new("Incident Management System", "ops@example.com"));
        assert_eq!(message.header("X-Incident-Status"), Some("RED"));
        assert_eq!(message.to, vec!["oncall@example.com"]);
        assert_eq!(message.from, "\"Incident Management System\" <ops@example.com>");
    }

    #[test]
    fn display_helpers() {
        assert_eq!(outage_end_display(IncidentStatus::Green, None), None);
        assert_eq!(outage_end_display(IncidentStatus::Amber, None), Some("N/A"));
        assert_eq!(outage_end_display(IncidentStatus::Unknown, None), Some("N/A"));
        assert_eq!(outage_end_display(IncidentStatus::Green, Some("12:00")), Some("12:00"));
        assert_eq!(teams_display(&[]), "N/A");
        assert_eq!(chain_of_events_html(None), "N/A");
        assert_eq!(chain_of_events_html(Some("one\ntwo")), "one<br>two");
    }
}
