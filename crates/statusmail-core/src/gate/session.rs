// ── Session records ──
//
// A session is an opaque random id plus an expiry. The repository trait
// lets the gate run against the in-memory map in production and against
// failing fakes in tests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;

/// Random session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub authenticated: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A fresh authenticated session valid for `ttl` from `now`.
    ///
    /// Expiry saturates at the latest representable instant.
    pub fn authenticated(now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            id: SessionId::generate(),
            authenticated: true,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.authenticated && !self.is_expired(now)
    }
}

/// Storage for sessions.
pub trait SessionRepository: std::fmt::Debug + Send + Sync + 'static {
    fn insert(&self, session: Session) -> Result<(), CoreError>;

    fn get(&self, id: &SessionId) -> Result<Option<Session>, CoreError>;

    /// Remove a session. Returns whether it existed.
    fn remove(&self, id: &SessionId) -> Result<bool, CoreError>;

    /// Drop every session expired at `now`. Returns how many were dropped.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError>;
}

/// Process-local session map. Sessions do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionRepository for InMemorySessionStore {
    fn insert(&self, session: Session) -> Result<(), CoreError> {
        self.sessions.insert(session.id, session);
        Ok(())
    }

    fn get(&self, id: &SessionId) -> Result<Option<Session>, CoreError> {
        Ok(self.sessions.get(id).map(|entry| entry.value().clone()))
    }

    fn remove(&self, id: &SessionId) -> Result<bool, CoreError> {
        Ok(self.sessions.remove(id).is_some())
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        Ok(before.saturating_sub(self.sessions.len()))
    }
}
