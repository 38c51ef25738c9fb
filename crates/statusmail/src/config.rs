//! CLI-side config loading.
//!
//! Resolves the config file path from `--config` / `STATUSMAIL_CONFIG`
//! and falls back to defaults when no file exists yet.

use std::path::PathBuf;

use statusmail_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file this invocation reads and writes.
pub fn path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(statusmail_config::config_path)
}

/// Load and validate the layered configuration.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = path(global);
    tracing::debug!(path = %path.display(), "loading config");
    Ok(statusmail_config::load_config(Some(&path))?)
}

/// Like [`load`], but an unreadable or invalid file yields the defaults.
pub fn load_or_default(global: &GlobalOpts) -> Config {
    load(global).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "using default config");
        Config::default()
    })
}
