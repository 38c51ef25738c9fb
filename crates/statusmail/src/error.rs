//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use statusmail_config::ConfigError;
use statusmail_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Report ───────────────────────────────────────────────────────
    #[error("Report is incomplete: {fields}")]
    #[diagnostic(
        code(statusmail::missing_fields),
        help("Fill in every listed field. AMBER and GREEN need outageEnd; GREEN also needs incidentId.")
    )]
    MissingFields { fields: String },

    #[error("Could not read report from {path}")]
    #[diagnostic(code(statusmail::report_unreadable))]
    ReportUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Report in {path} is not valid JSON")]
    #[diagnostic(
        code(statusmail::report_json),
        help("Expected an object such as {{\"recipient\": ..., \"status\": \"RED\", ...}}.")
    )]
    ReportJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Delivery ─────────────────────────────────────────────────────
    #[error("Email sending failed")]
    #[diagnostic(
        code(statusmail::delivery_failed),
        help(
            "{message}\n\
             Check mail.endpoint and the relay API key (statusmail config set-secret mail-api-key)."
        )
    )]
    DeliveryFailed { message: String },

    #[error("Could not render the report: {message}")]
    #[diagnostic(code(statusmail::render))]
    Render { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(code(statusmail::auth_failed))]
    AuthFailed,

    #[error("No {what} configured")]
    #[diagnostic(
        code(statusmail::no_credentials),
        help(
            "Run: statusmail config init\n\
             Or: statusmail config set-secret login-password"
        )
    )]
    NoCredentials { what: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(statusmail::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(statusmail::config),
        help("Check the config file (statusmail config path) and STATUSMAIL_* variables.")
    )]
    Config(Box<ConfigError>),

    // ── Server ───────────────────────────────────────────────────────
    #[error("Server error: {message}")]
    #[diagnostic(code(statusmail::server))]
    Server { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML output failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingFields { .. }
            | Self::ReportJson { .. }
            | Self::Validation { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DeliveryFailed { .. } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed,
            CoreError::Validation(e) => CliError::MissingFields {
                fields: e.labels().join(", "),
            },
            CoreError::Delivery { message, .. } => CliError::DeliveryFailed { message },
            CoreError::Render { message } => CliError::Render { message },
            CoreError::SessionStore { message } => CliError::Server { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { what } => CliError::NoCredentials { what },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use statusmail_core::IncidentReport;

    use super::*;

    #[test]
    fn validation_errors_exit_with_usage() {
        let err: CliError = CoreError::from(
            IncidentReport::default()
                .validate()
                .expect_err("empty report is invalid"),
        )
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(err.to_string().contains("Recipient Email"));
    }

    #[test]
    fn delivery_errors_exit_with_connection() {
        let err: CliError = CoreError::Delivery {
            message: "relay down".into(),
            transient: true,
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn missing_credentials_exit_with_auth() {
        let err: CliError = ConfigError::NoCredentials {
            what: "login password".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
