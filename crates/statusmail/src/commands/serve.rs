//! `serve`: run the HTTP server.

use std::sync::Arc;

use tracing::warn;

use statusmail_config::Config;

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::server::{self, AppState};

pub async fn handle(args: ServeArgs, mut cfg: Config) -> Result<(), CliError> {
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(dir) = args.static_dir {
        cfg.server.static_dir = dir;
    }

    let addr = cfg.server.socket_addr()?;
    let state = AppState::from_config(&cfg)?;

    if state.notifier.sender().is_disabled() {
        warn!("mail transport is disabled; reports will be logged, not sent");
    }
    if !state.static_dir.join("index.html").is_file() {
        warn!(
            static_dir = %state.static_dir.display(),
            "index.html not found; the form page will 404"
        );
    }

    server::serve(addr, Arc::new(state)).await
}
