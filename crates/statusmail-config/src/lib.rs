//! Configuration for the statusmail server and CLI.
//!
//! A TOML file plus `STATUSMAIL_*` environment overrides, credential
//! resolution (env + keyring + plaintext), and translation into the
//! runtime configs `statusmail_core` consumes.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use statusmail_core::{
    Branding, GateConfig, Mailbox, MailerConfig, NotifierConfig, StaticCredentials,
    TlsVerification,
};

/// Keyring service name shared by every stored secret.
pub const KEYRING_SERVICE: &str = "statusmail";

/// Env var that points at an alternative config file.
pub const CONFIG_ENV: &str = "STATUSMAIL_CONFIG";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {what} configured")]
    NoCredentials { what: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub branding: Branding,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `login.html`, `index.html` and their assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Frontend origin allowed to call the API with credentials.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: Option<String>,

    /// Mark the session cookie `Secure` (HTTPS deployments).
    #[serde(default)]
    pub cookie_secure: bool,

    /// Session lifetime, humantime syntax ("1h", "30m").
    #[serde(default = "default_session_ttl")]
    pub session_ttl: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            static_dir: default_static_dir(),
            cors_origin: default_cors_origin(),
            cookie_secure: false,
            session_ttl: default_session_ttl(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}
fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}
#[allow(clippy::unnecessary_wraps)]
fn default_cors_origin() -> Option<String> {
    Some("http://localhost:3000".into())
}
fn default_session_ttl() -> String {
    "1h".into()
}

/// The single account allowed to log in.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub email: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Log instead of sending.
    #[default]
    Disabled,
    /// POST to an HTTP mail relay.
    Relay,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    #[serde(default)]
    pub transport: Transport,

    /// Relay endpoint (e.g., "https://relay.example.com/v1/messages").
    pub endpoint: Option<String>,

    /// Environment variable name containing the relay API key.
    pub api_key_env: Option<String>,

    /// Relay API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Sender address. Required for the relay transport.
    pub from_address: Option<String>,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Relay request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Disabled,
            endpoint: None,
            api_key_env: None,
            api_key: None,
            from_address: None,
            from_name: default_from_name(),
            timeout: default_timeout(),
            ca_cert: None,
            insecure: false,
        }
    }
}

fn default_from_name() -> String {
    "Incident Management System".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "statusmail", "statusmail").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("statusmail");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file, then `STATUSMAIL_*` env vars.
///
/// Nested keys use a double underscore: `STATUSMAIL_SERVER__PORT=8080`.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STATUSMAIL_").split("__"))
}

/// Load the full Config from file + environment.
///
/// A missing file is not an error; defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Validation and translation ──────────────────────────────────────

impl Config {
    /// Reject values that would only fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session_ttl()?;
        self.server.socket_addr()?;
        if self.mail.transport == Transport::Relay {
            self.relay_endpoint()?;
            self.sender_address()?;
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.server.session_ttl).map_err(|e| ConfigError::Validation {
            field: "server.session_ttl".into(),
            reason: format!("'{}': {e}", self.server.session_ttl),
        })
    }

    pub fn gate_config(&self) -> Result<GateConfig, ConfigError> {
        Ok(GateConfig {
            session_ttl: self.session_ttl()?,
            ..GateConfig::default()
        })
    }

    pub fn notifier_config(&self) -> Result<NotifierConfig, ConfigError> {
        Ok(NotifierConfig {
            from: Mailbox::new(self.mail.from_name.clone(), self.sender_address()?),
            branding: self.branding.clone(),
        })
    }

    /// Build the mail transport config, resolving the relay API key.
    pub fn mailer_config(&self) -> Result<MailerConfig, ConfigError> {
        match self.mail.transport {
            Transport::Disabled => Ok(MailerConfig::Disabled),
            Transport::Relay => {
                let tls = if self.mail.insecure {
                    TlsVerification::DangerAcceptInvalid
                } else if let Some(ref ca_path) = self.mail.ca_cert {
                    TlsVerification::CustomCa(ca_path.clone())
                } else {
                    TlsVerification::SystemDefaults
                };

                Ok(MailerConfig::Relay {
                    endpoint: self.relay_endpoint()?,
                    api_key: resolve_mail_api_key(&self.mail),
                    tls,
                    timeout: Duration::from_secs(self.mail.timeout),
                })
            }
        }
    }

    /// The login account, with its password resolved.
    pub fn credentials(&self) -> Result<StaticCredentials, ConfigError> {
        let email = self
            .auth
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConfigError::NoCredentials {
                what: "login email (auth.email)".into(),
            })?;
        let password = resolve_login_password(&self.auth)?;
        Ok(StaticCredentials::new(email, password))
    }

    /// A copy safe to print: plaintext secrets replaced.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.auth.password.is_some() {
            cfg.auth.password = Some(REDACTED.into());
        }
        if cfg.mail.api_key.is_some() {
            cfg.mail.api_key = Some(REDACTED.into());
        }
        cfg
    }

    fn relay_endpoint(&self) -> Result<url::Url, ConfigError> {
        let raw = self
            .mail
            .endpoint
            .as_deref()
            .ok_or_else(|| ConfigError::Validation {
                field: "mail.endpoint".into(),
                reason: "required when mail.transport = \"relay\"".into(),
            })?;
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "mail.endpoint".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }

    fn sender_address(&self) -> Result<String, ConfigError> {
        match (self.mail.transport, self.mail.from_address.as_deref()) {
            (_, Some(addr)) if addr.contains('@') => Ok(addr.trim().to_owned()),
            (_, Some(addr)) => Err(ConfigError::Validation {
                field: "mail.from_address".into(),
                reason: format!("not an email address: {addr}"),
            }),
            (Transport::Disabled, None) => Ok("statusmail@localhost".into()),
            (Transport::Relay, None) => Err(ConfigError::Validation {
                field: "mail.from_address".into(),
                reason: "required when mail.transport = \"relay\"".into(),
            }),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind.parse().map_err(|_| ConfigError::Validation {
            field: "server.bind".into(),
            reason: format!("not an IP address: {}", self.bind),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Secrets that can live in the system keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    LoginPassword,
    MailApiKey,
}

impl SecretKind {
    pub const fn keyring_account(self) -> &'static str {
        match self {
            Self::LoginPassword => "login/password",
            Self::MailApiKey => "mail/api-key",
        }
    }

    /// Fixed env var consulted when no custom one is configured.
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::LoginPassword => "STATUSMAIL_LOGIN_PASSWORD",
            Self::MailApiKey => "STATUSMAIL_MAIL_API_KEY",
        }
    }
}

/// Read a secret from the system keyring, if one is stored.
pub fn keyring_secret(kind: SecretKind) -> Option<SecretString> {
    keyring::Entry::new(KEYRING_SERVICE, kind.keyring_account())
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Store a secret in the system keyring.
pub fn store_secret(kind: SecretKind, value: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, kind.keyring_account())?;
    entry.set_password(value.expose_secret())?;
    Ok(())
}

/// Resolution order: custom env var, fixed env var, keyring, plaintext.
fn resolve_secret(
    kind: SecretKind,
    custom_env: Option<&str>,
    plaintext: Option<&str>,
    keyring: impl FnOnce(SecretKind) -> Option<SecretString>,
) -> Option<SecretString> {
    // 1. Configured env var, then the fixed one
    for name in custom_env.into_iter().chain([kind.env_var()]) {
        if let Ok(val) = std::env::var(name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring(kind) {
        return Some(secret);
    }

    // 3. Plaintext in config
    plaintext
        .filter(|p| !p.is_empty())
        .map(|p| SecretString::from(p.to_owned()))
}

pub fn resolve_login_password(auth: &AuthConfig) -> Result<SecretString, ConfigError> {
    resolve_secret(
        SecretKind::LoginPassword,
        auth.password_env.as_deref(),
        auth.password.as_deref(),
        keyring_secret,
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        what: "login password".into(),
    })
}

/// The relay API key is optional; relays on a private network may not need one.
pub fn resolve_mail_api_key(mail: &MailConfig) -> Option<SecretString> {
    resolve_secret(
        SecretKind::MailApiKey,
        mail.api_key_env.as_deref(),
        mail.api_key.as_deref(),
        keyring_secret,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn from_toml(raw: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(raw))
            .extract()
            .unwrap()
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.static_dir, PathBuf::from("public"));
        assert_eq!(cfg.server.cors_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cfg.session_ttl().unwrap(), Duration::from_secs(3600));
        assert_eq!(cfg.mail.transport, Transport::Disabled);
        assert_eq!(cfg.mail.from_name, "Incident Management System");
        assert_eq!(
            cfg.server.socket_addr().unwrap(),
            "0.0.0.0:5000".parse::<SocketAddr>().unwrap()
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let cfg = from_toml(
            r#"
            [server]
            port = 8080
            session_ttl = "30m"

            [branding]
            region = "EMEA"
            "#,
        );
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.gate_config().unwrap().session_ttl, Duration::from_secs(1800));
        assert_eq!(cfg.branding.region, "EMEA");
        assert_eq!(cfg.branding.footer, Branding::default().footer);
    }

    #[test]
    fn bad_session_ttl_is_rejected() {
        let cfg = from_toml("[server]\nsession_ttl = \"forever\"\n");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("server.session_ttl"), "{err}");
    }

    #[test]
    fn relay_requires_endpoint_and_sender() {
        let cfg = from_toml("[mail]\ntransport = \"relay\"\n");
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "mail.endpoint"
        ));

        let cfg = from_toml(
            "[mail]\ntransport = \"relay\"\nendpoint = \"https://relay.example.com/v1/messages\"\n",
        );
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "mail.from_address"
        ));
    }

    #[test]
    fn relay_mailer_config() {
        let cfg = from_toml(
            r#"
            [mail]
            transport = "relay"
            endpoint = "https://relay.example.com/v1/messages"
            from_address = "ops@example.com"
            timeout = 5
            insecure = true
            "#,
        );
        cfg.validate().unwrap();
        match cfg.mailer_config().unwrap() {
            MailerConfig::Relay {
                endpoint,
                tls,
                timeout,
                ..
            } => {
                assert_eq!(endpoint.as_str(), "https://relay.example.com/v1/messages");
                assert_eq!(tls, TlsVerification::DangerAcceptInvalid);
                assert_eq!(timeout, Duration::from_secs(5));
            }
            MailerConfig::Disabled => panic!("expected relay"),
        }
        assert_eq!(
            cfg.notifier_config().unwrap().from.to_string(),
            "\"Incident Management System\" <ops@example.com>"
        );
    }

    #[test]
    fn disabled_transport_has_placeholder_sender() {
        let cfg = Config::default();
        assert!(matches!(cfg.mailer_config().unwrap(), MailerConfig::Disabled));
        assert_eq!(cfg.notifier_config().unwrap().from.address, "statusmail@localhost");
    }

    #[test]
    fn secret_chain_prefers_keyring_over_plaintext() {
        let from_keyring = resolve_secret(
            SecretKind::MailApiKey,
            Some("STATUSMAIL_TEST_UNSET_VAR_9F2C"),
            Some("plain"),
            |_| Some(SecretString::from("stored".to_owned())),
        );
        assert_eq!(from_keyring.unwrap().expose_secret(), "stored");

        let from_plaintext = resolve_secret(
            SecretKind::MailApiKey,
            Some("STATUSMAIL_TEST_UNSET_VAR_9F2C"),
            Some("plain"),
            |_| None,
        );
        assert_eq!(from_plaintext.unwrap().expose_secret(), "plain");

        let nothing = resolve_secret(SecretKind::MailApiKey, None, Some(""), |_| None);
        assert!(nothing.is_none());
    }

    #[test]
    fn credentials_require_email() {
        let cfg = from_toml("[auth]\npassword = \"pw\"\n");
        assert!(matches!(cfg.credentials(), Err(ConfigError::NoCredentials { .. })));
    }

    #[test]
    fn redacted_hides_plaintext_secrets() {
        let cfg = from_toml("[auth]\nemail = \"ops@example.com\"\npassword = \"hunter2\"\n");
        let shown = toml::to_string_pretty(&cfg.redacted()).unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn save_and_load_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.server.port = 6100;
        cfg.auth.email = Some("ops@example.com".into());
        save_config(&cfg, &path).unwrap();

        let loaded: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(loaded.server.port, 6100);
        assert_eq!(loaded.auth.email.as_deref(), Some("ops@example.com"));
    }
}
