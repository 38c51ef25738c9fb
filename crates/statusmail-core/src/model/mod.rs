// ── Domain model ──
//
// Transient types only: a report lives for one request, a status is a
// lookup into a fixed table. Nothing here is ever persisted.

pub mod report;
pub mod status;

pub use report::{IncidentReport, ReportField, TeamsEngaged};
pub use status::{IncidentStatus, StatusStyle};
