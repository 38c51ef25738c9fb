//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use statusmail_core::IncidentReport;

use crate::error::CliError;

/// Read an incident report from a JSON file, or stdin when `path` is `-`.
pub fn read_report(path: &Path) -> Result<IncidentReport, CliError> {
    let shown = path.display().to_string();
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::ReportUnreadable {
                path: "stdin".into(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::ReportUnreadable {
            path: shown.clone(),
            source,
        })?
    };
    parse_report(&contents, &shown)
}

fn parse_report(contents: &str, path: &str) -> Result<IncidentReport, CliError> {
    serde_json::from_str(contents).map_err(|source| CliError::ReportJson {
        path: path.into(),
        source,
    })
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
