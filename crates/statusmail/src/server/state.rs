use std::path::PathBuf;

use axum::http::HeaderValue;

use statusmail_config::Config;
use statusmail_core::{InMemorySessionStore, Mailer, Notifier, SessionGate, StaticCredentials};

use crate::error::CliError;

/// Shared by every request handler.
#[derive(Debug)]
pub struct AppState<M, R> {
    pub gate: SessionGate<StaticCredentials, R>,
    pub notifier: Notifier<M>,
    pub static_dir: PathBuf,
    pub cookie_secure: bool,
    pub cors_origin: Option<HeaderValue>,
}

impl AppState<Mailer, InMemorySessionStore> {
    pub fn from_config(cfg: &Config) -> Result<Self, CliError> {
        let gate = SessionGate::new(
            cfg.credentials()?,
            InMemorySessionStore::new(),
            cfg.gate_config()?,
        )?;
        let mailer = Mailer::from_config(&cfg.mailer_config()?)?;
        let notifier = Notifier::new(cfg.notifier_config()?, mailer)?;

        let cors_origin = cfg
            .server
            .cors_origin
            .as_deref()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| CliError::Validation {
                    field: "server.cors_origin".into(),
                    reason: format!("not a valid origin: {origin}"),
                })
            })
            .transpose()?;

        Ok(Self {
            gate,
            notifier,
            static_dir: cfg.server.static_dir.clone(),
            cookie_secure: cfg.server.cookie_secure,
            cors_origin,
        })
    }
}
