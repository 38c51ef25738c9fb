// ── Incident report submission ──
//
// The raw payload posted by the status form. Every field is optional at
// this layer; `validate` decides what is actually required.

use serde::{Deserialize, Serialize};

use super::status::IncidentStatus;

/// One submission of the incident status form.
///
/// Field names follow the form's JSON (`incidentTitle`, `outageStart`, ...).
/// Blank strings are treated the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outage_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outage_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    /// Conference bridge for this incident; overrides the configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_incident_managers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams_engaged: Option<TeamsEngaged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_of_events: Option<String>,
}

/// Teams engaged arrive either as a multi-select list or a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamsEngaged {
    List(Vec<String>),
    Text(String),
}

impl TeamsEngaged {
    /// Trimmed, non-blank team names.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect(),
            Self::Text(s) => Some(s.trim()).filter(|s| !s.is_empty()).into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

impl From<Vec<String>> for TeamsEngaged {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// A field of the report that validation can flag as missing.
///
/// `Display` yields the human label used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
pub enum ReportField {
    #[strum(to_string = "Recipient Email")]
    Recipient,
    #[strum(to_string = "Subject")]
    Subject,
    #[strum(to_string = "Status")]
    Status,
    #[strum(to_string = "Incident Title")]
    IncidentTitle,
    #[strum(to_string = "Description")]
    Description,
    #[strum(to_string = "Impact")]
    Impact,
    #[strum(to_string = "Outage Start")]
    OutageStart,
    #[strum(to_string = "Outage End")]
    OutageEnd,
    #[strum(to_string = "Incident ID")]
    IncidentId,
    #[strum(to_string = "Major Incident Managers")]
    MajorIncidentManagers,
    #[strum(to_string = "Teams Engaged")]
    TeamsEngaged,
    #[strum(to_string = "Chain of Events")]
    ChainOfEvents,
}

impl IncidentReport {
    /// The trimmed value of a text field, or `None` when absent or blank.
    ///
    /// `TeamsEngaged` is not a text field and always yields `None`; use
    /// [`teams`](Self::teams) instead.
    pub fn text(&self, field: ReportField) -> Option<&str> {
        let raw = match field {
            ReportField::Recipient => &self.recipient,
            ReportField::Subject => &self.subject,
            ReportField::Status => &self.status,
            ReportField::IncidentTitle => &self.incident_title,
            ReportField::Description => &self.description,
            ReportField::Impact => &self.impact,
            ReportField::OutageStart => &self.outage_start,
            ReportField::OutageEnd => &self.outage_end,
            ReportField::IncidentId => &self.incident_id,
            ReportField::MajorIncidentManagers => &self.major_incident_managers,
            ReportField::ChainOfEvents => &self.chain_of_events,
            ReportField::TeamsEngaged => return None,
        };
        raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Normalized status. An absent status also reads as `Unknown`;
    /// validation reports it missing separately.
    pub fn incident_status(&self) -> IncidentStatus {
        self.text(ReportField::Status)
            .map_or(IncidentStatus::Unknown, IncidentStatus::parse)
    }

    /// Recipient addresses; the field may list several separated by `,` or `;`.
    pub fn recipients(&self) -> Vec<String> {
        self.text(ReportField::Recipient)
            .map(|raw| {
                raw.split([',', ';'])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn teams(&self) -> Vec<String> {
        self.teams_engaged
            .as_ref()
            .map(|t| t.names().into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_form_json() {
        let report: IncidentReport = serde_json::from_value(serde_json::json!({
            "recipient": "a@example.com",
            "status": "AMBER",
            "incidentTitle": "Checkout latency",
            "teamsEngaged": ["Payments", "SRE"],
            "chainOfEvents": "10:00 alert\n10:05 paged",
        }))
        .expect("valid payload");

        assert_eq!(report.incident_status(), IncidentStatus::Amber);
        assert_eq!(report.text(ReportField::IncidentTitle), Some("Checkout latency"));
        assert_eq!(report.teams(), vec!["Payments", "SRE"]);
        assert_eq!(report.text(ReportField::Subject), None);
    }

    #[test]
    fn teams_engaged_accepts_single_string() {
        let report: IncidentReport =
            serde_json::from_value(serde_json::json!({ "teamsEngaged": "Networking" }))
                .expect("valid payload");
        assert_eq!(report.teams(), vec!["Networking"]);
    }

    #[test]
    fn blank_teams_are_empty() {
        assert!(TeamsEngaged::List(vec![]).is_empty());
        assert!(TeamsEngaged::List(vec!["  ".into()]).is_empty());
        assert!(TeamsEngaged::Text("   ".into()).is_empty());
        assert!(!TeamsEngaged::Text("SRE".into()).is_empty());
    }

    #[test]
    fn blank_text_reads_as_absent() {
        let report = IncidentReport {
            description: Some("   ".into()),
            ..IncidentReport::default()
        };
        assert_eq!(report.text(ReportField::Description), None);
    }

    #[test]
    fn recipients_split_on_separators() {
        let report = IncidentReport {
            recipient: Some("a@example.com, b@example.com; ;c@example.com".into()),
            ..IncidentReport::default()
        };
        assert_eq!(
            report.recipients(),
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
    }

    #[test]
    fn field_labels() {
        assert_eq!(ReportField::Recipient.to_string(), "Recipient Email");
        assert_eq!(ReportField::OutageEnd.to_string(), "Outage End");
        assert_eq!(ReportField::IncidentId.to_string(), "Incident ID");
        assert_eq!(ReportField::ChainOfEvents.to_string(), "Chain of Events");
    }
}
