// ── Runtime configuration ──
//
// These types describe how to compose, deliver and gate. They carry
// credentials and presentation settings but never touch disk: the config
// crate (or a test) builds them and hands them in.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// An email sender or recipient, optionally with a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address: address.into(),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{}\" <{}>", name.replace('"', ""), self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// Organisation-specific text stamped into every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub region: String,
    pub reporter: String,
    /// Default conference bridge; a report's own link takes precedence.
    pub bridge_url: Option<String>,
    pub footer: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            region: "Global".into(),
            reporter: "Operations Command Center".into(),
            bridge_url: None,
            footer: "Incident Management System".into(),
        }
    }
}

/// Everything the notifier needs besides a mail sender.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub from: Mailbox,
    pub branding: Branding,
}

/// Session gate settings.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// How long a session stays valid after login.
    pub session_ttl: Duration,
    /// Where unauthenticated page requests are redirected.
    pub login_page: String,
    /// Where a successful login sends the browser.
    pub landing_page: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(3600),
            login_page: "/login.html".into(),
            landing_page: "/".into(),
        }
    }
}

/// TLS verification strategy for the mail relay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab relays).
    DangerAcceptInvalid,
}

/// How rendered reports leave the process.
#[derive(Debug, Clone, Default)]
pub enum MailerConfig {
    /// Log the message and report success. Local development only.
    #[default]
    Disabled,
    /// POST each message to an HTTP mail relay.
    Relay {
        endpoint: Url,
        api_key: Option<SecretString>,
        tls: TlsVerification,
        timeout: Duration,
    },
}

impl From<&TlsVerification> for statusmail_api::TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}
