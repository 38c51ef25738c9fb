//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use statusmail_config::{AuthConfig, Config, MailConfig, SecretKind, Transport};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretTarget};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

impl From<SecretTarget> for SecretKind {
    fn from(target: SecretTarget) -> Self {
        match target {
            SecretTarget::LoginPassword => Self::LoginPassword,
            SecretTarget::MailApiKey => Self::MailApiKey,
        }
    }
}

fn label(kind: SecretKind) -> &'static str {
    match kind {
        SecretKind::LoginPassword => "Login password",
        SecretKind::MailApiKey => "Relay API key",
    }
}

/// Prompt for a secret without echo, rejecting empty input.
fn prompt_secret(kind: SecretKind) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(format!("{}: ", label(kind))).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: kind.keyring_account().into(),
            reason: format!("{} cannot be empty", label(kind)),
        });
    }
    Ok(secret)
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(secret: String, kind: SecretKind) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {}?", label(kind).to_lowercase()))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        statusmail_config::store_secret(kind, &SecretString::from(secret))?;
        eprintln!("   ✓ {} stored in system keyring", label(kind));
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

fn prompt_text(prompt: &str, default: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(default) = default {
        input = input.default(default.to_owned());
    }
    input.interact_text().map_err(prompt_err)
}

/// Interactive setup for the login account and mail transport.
fn wizard(existing: Config) -> Result<Config, CliError> {
    let mut cfg = existing;

    // 1. Login account
    let email = prompt_text("Login email", cfg.auth.email.as_deref())?;
    let password = prompt_secret(SecretKind::LoginPassword)?;
    cfg.auth = AuthConfig {
        email: Some(email.trim().to_owned()),
        password_env: cfg.auth.password_env.take(),
        password: prompt_keyring_storage(password, SecretKind::LoginPassword)?,
    };

    // 2. Mail transport
    let transports = &[
        "Disabled (log reports, send nothing)",
        "HTTP mail relay",
    ];
    let selection = Select::new()
        .with_prompt("Mail transport")
        .items(transports)
        .default(usize::from(cfg.mail.transport == Transport::Relay))
        .interact()
        .map_err(prompt_err)?;

    if selection == 1 {
        let endpoint = prompt_text("Relay endpoint URL", cfg.mail.endpoint.as_deref())?;
        let from_address = prompt_text("Sender address", cfg.mail.from_address.as_deref())?;
        let api_key = rpassword::prompt_password("Relay API key (empty for none): ")
            .map_err(prompt_err)?;
        let api_key = if api_key.is_empty() {
            None
        } else {
            prompt_keyring_storage(api_key, SecretKind::MailApiKey)?
        };

        cfg.mail = MailConfig {
            transport: Transport::Relay,
            endpoint: Some(endpoint),
            from_address: Some(from_address),
            api_key,
            ..cfg.mail
        };
    } else {
        cfg.mail.transport = Transport::Disabled;
    }

    // 3. Listener
    let port: u16 = Input::new()
        .with_prompt("HTTP port")
        .default(cfg.server.port)
        .interact_text()
        .map_err(prompt_err)?;
    cfg.server.port = port;

    cfg.validate()?;
    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::path(global);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            eprintln!("statusmail configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            if path.exists() {
                let overwrite = Confirm::new()
                    .with_prompt("A config file already exists. Update it?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?;
                if !overwrite {
                    return Ok(());
                }
            }

            let cfg = wizard(config::load_or_default(global))?;
            statusmail_config::save_config(&cfg, &path)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("\n  Start the server: statusmail serve");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?.redacted();
            let text = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(global.output, &cfg, |_| text.clone(), |_| {
                path.display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── SetSecret ───────────────────────────────────────────────
        ConfigCommand::SetSecret { secret } => {
            let kind = SecretKind::from(secret);
            let value = prompt_secret(kind)?;
            statusmail_config::store_secret(kind, &SecretString::from(value))?;
            if !global.quiet {
                eprintln!("✓ {} stored in system keyring", label(kind));
            }
            Ok(())
        }
    }
}
