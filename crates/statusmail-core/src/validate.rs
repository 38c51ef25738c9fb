// ── Report validation ──
//
// Pure functions: no I/O, no early return. Every missing field is
// collected so the form can highlight all of them at once.

use serde::Serialize;
use thiserror::Error;

use crate::model::{IncidentReport, IncidentStatus, ReportField};

/// Fields required regardless of status, in reporting order.
const ALWAYS_REQUIRED: [ReportField; 10] = [
    ReportField::Recipient,
    ReportField::Subject,
    ReportField::Status,
    ReportField::IncidentTitle,
    ReportField::Description,
    ReportField::Impact,
    ReportField::OutageStart,
    ReportField::MajorIncidentManagers,
    ReportField::TeamsEngaged,
    ReportField::ChainOfEvents,
];

/// A report failed validation. Carries every missing field, in order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing Fields: {}", self.labels().join(", "))]
pub struct ValidationError {
    missing: Vec<ReportField>,
}

impl ValidationError {
    pub fn missing(&self) -> &[ReportField] {
        &self.missing
    }

    pub fn contains(&self, field: ReportField) -> bool {
        self.missing.contains(&field)
    }

    /// Human labels of the missing fields, e.g. `["Subject", "Outage End"]`.
    pub fn labels(&self) -> Vec<String> {
        self.missing.iter().map(ToString::to_string).collect()
    }
}

/// Collect every field the report is missing.
///
/// Unconditional fields come first, then the status-dependent ones:
/// Outage End for AMBER and GREEN, Incident ID for GREEN.
pub fn missing_fields(report: &IncidentReport) -> Vec<ReportField> {
    let mut missing: Vec<ReportField> = ALWAYS_REQUIRED
        .into_iter()
        .filter(|field| !is_present(report, *field))
        .collect();

    let status = report.incident_status();
    if status.requires_outage_end() && !is_present(report, ReportField::OutageEnd) {
        missing.push(ReportField::OutageEnd);
    }
    if status.requires_incident_id() && !is_present(report, ReportField::IncidentId) {
        missing.push(ReportField::IncidentId);
    }

    missing
}

fn is_present(report: &IncidentReport, field: ReportField) -> bool {
    match field {
        ReportField::TeamsEngaged => !report.teams().is_empty(),
        ReportField::Recipient => !report.recipients().is_empty(),
        other => report.text(other).is_some(),
    }
}

/// A report that passed validation. Required fields are plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedReport {
    pub status: IncidentStatus,
    pub recipients: Vec<String>,
    pub subject: String,
    pub incident_title: String,
    pub description: String,
    pub impact: String,
    pub outage_start: String,
    pub outage_end: Option<String>,
    pub slack_channel: Option<String>,
    pub incident_id: Option<String>,
    pub zoom_link: Option<String>,
    pub major_incident_managers: String,
    pub teams_engaged: Vec<String>,
    pub chain_of_events: String,
}

impl IncidentReport {
    /// Validate and convert into a [`ValidatedReport`].
    pub fn validate(&self) -> Result<ValidatedReport, ValidationError> {
        let missing = missing_fields(self);
        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        let required = |field| self.text(field).unwrap_or_default().to_owned();
        let optional = |field| self.text(field).map(str::to_owned);

        Ok(ValidatedReport {
            status: self.incident_status(),
            recipients: self.recipients(),
            subject: required(ReportField::Subject),
            incident_title: required(ReportField::IncidentTitle),
            description: required(ReportField::Description),
            impact: required(ReportField::Impact),
            outage_start: required(ReportField::OutageStart),
            outage_end: optional(ReportField::OutageEnd),
            slack_channel: self
                .slack_channel
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            incident_id: optional(ReportField::IncidentId),
            zoom_link: self
                .zoom_link
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            major_incident_managers: required(ReportField::MajorIncidentManagers),
            teams_engaged: self.teams(),
            chain_of_events: required(ReportField::ChainOfEvents),
        })
    }
}
