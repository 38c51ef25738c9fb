// Wire types for the mail relay.
//
// The relay accepts one JSON document per message and answers with an
// optional message id. Field names follow the relay's JSON contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fully rendered message, ready to hand to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Sender mailbox, e.g. `"Incident Management System" <ops@example.com>`.
    pub from: String,
    /// One or more recipient addresses.
    pub to: Vec<String>,
    pub subject: String,
    /// Extra headers attached to the message (e.g. `X-Incident-Status`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// HTML body.
    pub html: String,
}

impl MailMessage {
    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Acknowledgement returned by the relay for an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Relay-assigned message id, when the relay reports one.
    #[serde(default)]
    pub id: Option<String>,
}
