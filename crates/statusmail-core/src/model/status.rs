// ── Incident status table ──
//
// One lookup table drives every status-dependent decision: subject tag,
// display label, banner color, and which extra fields become required.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical incident status.
///
/// `Unknown` is never selectable; it is what an unrecognized submitted
/// value normalizes to so rendering can proceed with a neutral style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentStatus {
    Red,
    Amber,
    Green,
    Unknown,
}

/// Presentation and validation attributes for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub status: IncidentStatus,
    /// Uppercase tag used in subject lines and the `X-Incident-Status` header.
    pub tag: &'static str,
    /// Human-readable phrase shown as "Current Status".
    pub label: &'static str,
    /// Banner background color.
    pub color: &'static str,
    pub requires_outage_end: bool,
    pub requires_incident_id: bool,
}

const STATUS_TABLE: [StatusStyle; 4] = [
    StatusStyle {
        status: IncidentStatus::Red,
        tag: "RED",
        label: "Investigating",
        color: "#d32f2f",
        requires_outage_end: false,
        requires_incident_id: false,
    },
    StatusStyle {
        status: IncidentStatus::Amber,
        tag: "AMBER",
        label: "Under Observation",
        color: "#ff9800",
        requires_outage_end: true,
        requires_incident_id: false,
    },
    StatusStyle {
        status: IncidentStatus::Green,
        tag: "GREEN",
        label: "Resolved",
        color: "#388e3c",
        requires_outage_end: true,
        requires_incident_id: true,
    },
    UNKNOWN_STYLE,
];

const UNKNOWN_STYLE: StatusStyle = StatusStyle {
    status: IncidentStatus::Unknown,
    tag: "UNKNOWN",
    label: "Unknown",
    color: "#6c757d",
    requires_outage_end: false,
    requires_incident_id: false,
};

impl IncidentStatus {
    /// The statuses a user can actually select, in escalation order.
    pub const SELECTABLE: [Self; 3] = [Self::Red, Self::Amber, Self::Green];

    /// Normalize a submitted status value (trim + case-fold).
    ///
    /// Anything outside red / amber / green maps to [`Unknown`](Self::Unknown).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "red" => Self::Red,
            "amber" => Self::Amber,
            "green" => Self::Green,
            _ => Self::Unknown,
        }
    }

    pub fn style(self) -> &'static StatusStyle {
        STATUS_TABLE
            .iter()
            .find(|s| s.status == self)
            .unwrap_or(&UNKNOWN_STYLE)
    }

    pub fn tag(self) -> &'static str {
        self.style().tag
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }

    pub fn color(self) -> &'static str {
        self.style().color
    }

    pub fn requires_outage_end(self) -> bool {
        self.style().requires_outage_end
    }

    pub fn requires_incident_id(self) -> bool {
        self.style().requires_incident_id
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(IncidentStatus::parse("RED"), IncidentStatus::Red);
        assert_eq!(IncidentStatus::parse("  amber "), IncidentStatus::Amber);
        assert_eq!(IncidentStatus::parse("Green"), IncidentStatus::Green);
    }

    #[test]
    fn unrecognized_values_fall_back_to_unknown() {
        let status = IncidentStatus::parse("purple");
        assert_eq!(status, IncidentStatus::Unknown);
        assert_eq!(status.tag(), "UNKNOWN");
        assert_eq!(status.label(), "Unknown");
        assert!(!status.requires_outage_end());
        assert!(!status.requires_incident_id());
    }

    #[test]
    fn table_labels_and_colors() {
        assert_eq!(IncidentStatus::Red.label(), "Investigating");
        assert_eq!(IncidentStatus::Amber.label(), "Under Observation");
        assert_eq!(IncidentStatus::Green.label(), "Resolved");
        assert_eq!(IncidentStatus::Red.color(), "#d32f2f");
        assert_eq!(IncidentStatus::Amber.color(), "#ff9800");
        assert_eq!(IncidentStatus::Green.color(), "#388e3c");
    }

    #[test]
    fn outage_end_required_for_amber_and_green_only() {
        assert!(!IncidentStatus::Red.requires_outage_end());
        assert!(IncidentStatus::Amber.requires_outage_end());
        assert!(IncidentStatus::Green.requires_outage_end());
        assert!(IncidentStatus::Green.requires_incident_id());
        assert!(!IncidentStatus::Amber.requires_incident_id());
    }

    #[test]
    fn every_status_has_exactly_one_table_entry() {
        for status in IncidentStatus::SELECTABLE
            .into_iter()
            .chain([IncidentStatus::Unknown])
        {
            let count = STATUS_TABLE.iter().filter(|s| s.status == status).count();
            assert_eq!(count, 1, "{status:?}");
            assert_eq!(status.to_string(), status.tag());
        }
    }
}
