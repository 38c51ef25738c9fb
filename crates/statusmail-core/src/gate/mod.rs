// ── Session gate ──
//
// Decides who may see the form page and who may send reports. Pages
// redirect to the login page when denied; API routes answer 401.

pub mod credentials;
pub mod session;

use chrono::Utc;
use tracing::{debug, info, warn};

pub use credentials::{CredentialStore, StaticCredentials};
pub use session::{InMemorySessionStore, Session, SessionId, SessionRepository};

use crate::config::GateConfig;
use crate::error::CoreError;

/// What kind of route a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Browser-facing page; denial redirects.
    Page,
    /// JSON endpoint; denial is a 401.
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Send the browser to this path.
    Redirect(String),
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny(Denial),
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    /// Where the client should navigate next.
    pub redirect: String,
}

#[derive(Debug)]
pub struct SessionGate<C, R> {
    credentials: C,
    sessions: R,
    config: GateConfig,
    ttl: chrono::Duration,
}

impl<C: CredentialStore, R: SessionRepository> SessionGate<C, R> {
    pub fn new(credentials: C, sessions: R, config: GateConfig) -> Result<Self, CoreError> {
        let ttl = chrono::Duration::from_std(config.session_ttl).map_err(|e| CoreError::Config {
            message: format!("session TTL out of range: {e}"),
        })?;
        if Utc::now().checked_add_signed(ttl).is_none() {
            return Err(CoreError::Config {
                message: format!("session TTL out of range: {}s", config.session_ttl.as_secs()),
            });
        }
        Ok(Self {
            credentials,
            sessions,
            config,
            ttl,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn sessions(&self) -> &R {
        &self.sessions
    }

    /// Check the pair and open a new authenticated session.
    ///
    /// Any session the client already held is dropped first so a login
    /// always yields a fresh id.
    pub fn login(
        &self,
        current: Option<&SessionId>,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, CoreError> {
        if !self.credentials.verify(email, password) {
            warn!(email = %email.trim(), "login rejected");
            return Err(CoreError::invalid_credentials());
        }

        if let Some(old) = current {
            self.sessions.remove(old)?;
        }

        let session = Session::authenticated(Utc::now(), self.ttl);
        self.sessions.insert(session.clone())?;
        info!(email = %email.trim(), expires_at = %session.expires_at, "login succeeded");

        Ok(LoginOutcome {
            session,
            redirect: self.config.landing_page.clone(),
        })
    }

    /// Destroy the session, if any. Only a store failure is an error.
    pub fn logout(&self, current: Option<&SessionId>) -> Result<(), CoreError> {
        if let Some(id) = current {
            let existed = self.sessions.remove(id)?;
            debug!(%id, existed, "session destroyed");
        }
        Ok(())
    }

    pub fn is_authenticated(&self, current: Option<&SessionId>) -> bool {
        let Some(id) = current else {
            return false;
        };
        match self.sessions.get(id) {
            Ok(Some(session)) => session.is_active(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "session lookup failed; treating request as anonymous");
                false
            }
        }
    }

    pub fn guard(&self, current: Option<&SessionId>, kind: ResourceKind) -> Access {
        if self.is_authenticated(current) {
            return Access::Allow;
        }
        match kind {
            ResourceKind::Page => Access::Deny(Denial::Redirect(self.config.login_page.clone())),
            ResourceKind::Api => Access::Deny(Denial::Unauthorized),
        }
    }

    /// Remove expired sessions. Called periodically by the server.
    pub fn purge_expired(&self) -> Result<usize, CoreError> {
        let purged = self.sessions.purge_expired(Utc::now())?;
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
        Ok(purged)
    }
}
