// statusmail-core: incident report validation, rendering, delivery and session gating.
//
// Never reads files or the environment; callers hand in runtime configs.

pub mod config;
pub mod error;
pub mod gate;
pub mod model;
pub mod notifier;
pub mod render;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Branding, GateConfig, Mailbox, MailerConfig, NotifierConfig, TlsVerification};
pub use error::CoreError;
pub use gate::{
    Access, CredentialStore, Denial, InMemorySessionStore, LoginOutcome, ResourceKind, Session,
    SessionGate, SessionId, SessionRepository, StaticCredentials,
};
pub use model::{IncidentReport, IncidentStatus, ReportField, StatusStyle, TeamsEngaged};
pub use notifier::{Delivered, MailSender, Mailer, Notifier};
pub use render::{RenderedEmail, Renderer, STATUS_HEADER};
pub use validate::{ValidatedReport, ValidationError, missing_fields};
