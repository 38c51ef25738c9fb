// ── Core error types ──
//
// User-facing errors from statusmail-core. Consumers never see relay
// status codes or response bodies directly: the `From<statusmail_api::Error>`
// impl folds every transport failure into `Delivery`, keeping the detail
// in the message for server-side logs.

use thiserror::Error;

use crate::validate::ValidationError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session gate ─────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session store error: {message}")]
    SessionStore { message: String },

    // ── Composer ─────────────────────────────────────────────────────
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Template rendering failed: {message}")]
    Render { message: String },

    // ── Delivery ─────────────────────────────────────────────────────
    #[error("Email delivery failed: {message}")]
    Delivery {
        message: String,
        /// Whether the relay failure looked temporary (timeout, 5xx, 429).
        transient: bool,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Generic "invalid credentials" failure. Never says which field was wrong.
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationFailed {
            message: "Invalid credentials".into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<statusmail_api::Error> for CoreError {
    fn from(err: statusmail_api::Error) -> Self {
        let transient = err.is_transient();
        match err {
            statusmail_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid mail relay URL: {e}"),
            },
            statusmail_api::Error::Tls(msg) => CoreError::Delivery {
                message: format!("TLS error talking to mail relay: {msg}"),
                transient,
            },
            other => CoreError::Delivery {
                message: other.to_string(),
                transient,
            },
        }
    }
}

impl From<handlebars::RenderError> for CoreError {
    fn from(err: handlebars::RenderError) -> Self {
        CoreError::Render {
            message: err.to_string(),
        }
    }
}

impl From<handlebars::TemplateError> for CoreError {
    fn from(err: handlebars::TemplateError) -> Self {
        CoreError::Render {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_errors_fold_into_delivery() {
        let err: CoreError = statusmail_api::Error::Rejected {
            status: 503,
            message: "overloaded".into(),
        }
        .into();
        match err {
            CoreError::Delivery { message, transient } => {
                assert!(message.contains("503"));
                assert!(transient);
            }
            other => panic!("expected Delivery, got {other:?}"),
        }
    }

    #[test]
    fn invalid_api_key_is_not_transient() {
        let err: CoreError = statusmail_api::Error::InvalidApiKey.into();
        assert!(matches!(err, CoreError::Delivery { transient: false, .. }));
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        assert_eq!(
            CoreError::invalid_credentials().to_string(),
            "Authentication failed: Invalid credentials"
        );
    }
}
