// Mail relay HTTP client
//
// Wraps `reqwest::Client` with the relay's single endpoint: one JSON
// message per POST, bearer-token auth, and status-code to error mapping.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::message::{DeliveryReceipt, MailMessage};
use crate::transport::TransportConfig;

/// Raw HTTP client for the mail relay.
///
/// Every call is a single attempt. Retries, if wanted, belong to the
/// caller; the notifier makes none.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl RelayClient {
    /// Create a relay client from a `TransportConfig`.
    ///
    /// When `api_key` is set it is sent as `Authorization: Bearer <key>` on
    /// every request.
    pub fn new(
        endpoint: Url,
        api_key: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|_| Error::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            endpoint,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Create a relay client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            timeout_secs: 0,
        }
    }

    /// Submit one message to the relay.
    pub async fn send(&self, message: &MailMessage) -> Result<DeliveryReceipt, Error> {
        debug!(
            endpoint = %self.endpoint,
            recipients = message.to.len(),
            subject = %message.subject,
            "submitting message to mail relay"
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        match status {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(Error::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);
                return Err(Error::RateLimited { retry_after_secs });
            }
            _ => {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Rejected {
                    status: status.as_u16(),
                    message: body,
                });
            }
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;
        trace!(body = %body, "relay response");

        // The receipt is informational only. A 2xx means the relay took the
        // message, whatever the body looks like.
        if body.trim().is_empty() {
            return Ok(DeliveryReceipt::default());
        }

        match serde_json::from_str(&body) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                debug!(error = %e, body = %body, "relay receipt not understood; accepting delivery");
                Ok(DeliveryReceipt::default())
            }
        }
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() && self.timeout_secs > 0 {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}
