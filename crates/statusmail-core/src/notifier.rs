// ── Status notification composer ──
//
// validate → render → send. Validation failures never reach the sender,
// and a failed send is reported once with no retry.

use std::future::Future;

use serde::Serialize;
use statusmail_api::{DeliveryReceipt, MailMessage, RelayClient, TransportConfig};
use tracing::{debug, error, info, warn};

use crate::config::{Mailbox, MailerConfig, NotifierConfig};
use crate::error::CoreError;
use crate::model::{IncidentReport, IncidentStatus};
use crate::render::{RenderedEmail, Renderer};

/// The seam between composing a report and getting it out of the process.
pub trait MailSender: std::fmt::Debug + Send + Sync + 'static {
    fn send<'s>(
        &'s self,
        message: MailMessage,
    ) -> impl Future<Output = Result<DeliveryReceipt, CoreError>> + Send + 's;
}

/// Production mail sender, selected by [`MailerConfig`].
#[derive(Debug)]
pub enum Mailer {
    Disabled,
    Relay(RelayClient),
}

impl Mailer {
    pub fn from_config(config: &MailerConfig) -> Result<Self, CoreError> {
        match config {
            MailerConfig::Disabled => Ok(Self::Disabled),
            MailerConfig::Relay {
                endpoint,
                api_key,
                tls,
                timeout,
            } => {
                let transport = TransportConfig {
                    tls: tls.into(),
                    timeout: *timeout,
                };
                let client = RelayClient::new(endpoint.clone(), api_key.as_ref(), &transport)?;
                Ok(Self::Relay(client))
            }
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl MailSender for Mailer {
    async fn send<'s>(&'s self, message: MailMessage) -> Result<DeliveryReceipt, CoreError> {
        match self {
            Mailer::Disabled => {
                warn!(
                    to = ?message.to,
                    subject = %message.subject,
                    "skipping status email (mail transport disabled)"
                );
                Ok(DeliveryReceipt::default())
            }
            Mailer::Relay(client) => Ok(client.send(&message).await?),
        }
    }
}

/// Outcome of a successful [`Notifier::notify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivered {
    pub status: IncidentStatus,
    pub subject: String,
    pub recipients: Vec<String>,
    pub message_id: Option<String>,
}

/// Validates, renders and delivers incident status reports.
#[derive(Debug)]
pub struct Notifier<M> {
    renderer: Renderer,
    from: Mailbox,
    sender: M,
}

impl<M: MailSender> Notifier<M> {
    pub fn new(config: NotifierConfig, sender: M) -> Result<Self, CoreError> {
        Ok(Self {
            renderer: Renderer::try_new(config.branding)?,
            from: config.from,
            sender,
        })
    }

    pub fn sender(&self) -> &M {
        &self.sender
    }

    /// Validate and render without sending.
    pub fn compose(&self, report: &IncidentReport) -> Result<RenderedEmail, CoreError> {
        let validated = report.validate().inspect_err(|e| {
            info!(missing = ?e.labels(), "incident report rejected");
        })?;
        self.renderer.render(&validated)
    }

    /// The relay message a rendered report turns into.
    pub fn message(&self, email: &RenderedEmail) -> MailMessage {
        email.to_message(&self.from)
    }

    /// Validate, render and hand the report to the mail sender.
    pub async fn notify(&self, report: &IncidentReport) -> Result<Delivered, CoreError> {
        let email = self.compose(report)?;
        let message = self.message(&email);
        debug!(status = %email.status, recipients = email.recipients.len(), "sending status email");

        let receipt = self.sender.send(message).await.inspect_err(|e| {
            error!(error = %e, status = %email.status, subject = %email.subject, "status email delivery failed");
        })?;

        info!(
            status = %email.status,
            recipients = email.recipients.len(),
            message_id = receipt.id.as_deref().unwrap_or("-"),
            "status email sent"
        );

        Ok(Delivered {
            status: email.status,
            subject: email.subject,
            recipients: email.recipients,
            message_id: receipt.id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::Branding;
    use crate::model::{ReportField, TeamsEngaged};

    #[derive(Debug, Default, Clone)]
    struct RecordingSender {
        sent: Arc<Mutex<Vec<MailMessage>>>,
        fail: bool,
    }

    impl MailSender for RecordingSender {
        async fn send<'s>(&'s self, message: MailMessage) -> Result<DeliveryReceipt, CoreError> {
            self.sent.lock().unwrap().push(message);
            if self.fail {
                Err(statusmail_api::Error::Rejected {
                    status: 502,
                    message: "bad gateway".into(),
                }
                .into())
            } else {
                Ok(DeliveryReceipt {
                    id: Some("msg-1".into()),
                })
            }
        }
    }

    fn notifier(sender: RecordingSender) -> Notifier<RecordingSender> {
        let config = NotifierConfig {
            from: Mailbox::new("Incident Management System", "ops@example.com"),
            branding: Branding::default(),
        };
        Notifier::new(config, sender).unwrap()
    }

    fn report() -> IncidentReport {
        IncidentReport {
            recipient: Some("a@example.com; b@example.com".into()),
            subject: Some("update".into()),
            status: Some("AMBER".into()),
            incident_title: Some("Login failures".into()),
            description: Some("SSO errors".into()),
            impact: Some("Staff cannot log in".into()),
            outage_start: Some("09:00".into()),
            outage_end: Some("09:45".into()),
            major_incident_managers: Some("J. Doe".into()),
            teams_engaged: Some(TeamsEngaged::Text("Identity".into())),
            chain_of_events: Some("09:00 alert".into()),
            ..IncidentReport::default()
        }
    }

    #[tokio::test]
    async fn notify_sends_rendered_message() {
        let sender = RecordingSender::default();
        let notifier = notifier(sender.clone());

        let delivered = notifier.notify(&report()).await.unwrap();
        assert_eq!(delivered.status, IncidentStatus::Amber);
        assert_eq!(delivered.message_id.as_deref(), Some("msg-1"));
        assert_eq!(delivered.subject, "AMBER S1 Outage Communication | Login failures");

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["a@example.com", "b@example.com"]);
        assert_eq!(sent[0].header("X-Incident-Status"), Some("AMBER"));
        assert_eq!(sent[0].from, "\"Incident Management System\" <ops@example.com>");
        assert!(sent[0].html.contains("Under Observation"));
    }

    #[tokio::test]
    async fn invalid_report_never_reaches_sender() {
        let sender = RecordingSender::default();
        let notifier = notifier(sender.clone());

        let bad = IncidentReport {
            outage_end: None,
            ..report()
        };
        match notifier.notify(&bad).await {
            Err(CoreError::Validation(e)) => assert!(e.contains(ReportField::OutageEnd)),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sender_failure_surfaces_as_delivery_error() {
        let sender = RecordingSender {
            fail: true,
            ..RecordingSender::default()
        };
        let notifier = notifier(sender.clone());

        let err = notifier.notify(&report()).await.unwrap_err();
        assert!(matches!(err, CoreError::Delivery { transient: true, .. }));
        assert_eq!(sender.sent.lock().unwrap().len(), 1, "no retry");
    }

    #[tokio::test]
    async fn disabled_mailer_reports_success() {
        let mailer = Mailer::from_config(&MailerConfig::Disabled).unwrap();
        assert!(mailer.is_disabled());
        let notifier = notifier(RecordingSender::default());
        let message = notifier.message(&notifier.compose(&report()).unwrap());
        let receipt = mailer.send(message).await.unwrap();
        assert_eq!(receipt.id, None);
    }
}
