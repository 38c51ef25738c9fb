//! HTTP surface: login, logout, the gated form page and the send endpoint.

mod error;
mod gate;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, header};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, get_service, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use statusmail_core::{MailSender, SessionRepository};

pub use state::AppState;

use crate::error::CliError;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

type Shared<M, R> = Arc<AppState<M, R>>;

/// Build the application router.
///
/// `/`, `/index.html` and any other path the static service would resolve to
/// the form page need a session; everything else under the static directory
/// (the login page, scripts) is public.
pub fn router<M: MailSender, R: SessionRepository>(state: Shared<M, R>) -> Router {
    let index = state.static_dir.join(gate::FORM_PAGE);

    let pages: Router<Shared<M, R>> = Router::new()
        .route("/", get_service(ServeFile::new(&index)))
        .route("/index.html", get_service(ServeFile::new(&index)));

    let api: Router<Shared<M, R>> = Router::new()
        .route("/send-email", post(handlers::send_email::<M, R>))
        .route_layer(from_fn_with_state(
            state.clone(),
            gate::require_api_session::<M, R>,
        ));

    let assets = ServeDir::new(&state.static_dir).append_index_html_on_directories(false);

    let mut app = Router::new()
        .route("/login", post(handlers::login::<M, R>))
        .route("/logout", post(handlers::logout::<M, R>))
        .route("/health", get(handlers::health))
        .merge(pages)
        .merge(api)
        .fallback_service(assets)
        .layer(from_fn_with_state(
            state.clone(),
            gate::require_form_page_session::<M, R>,
        ))
        .with_state(state.clone());

    if let Some(origin) = state.cors_origin.clone() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    app.layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C, sweeping expired sessions in the background.
pub async fn serve<M: MailSender, R: SessionRepository>(
    addr: SocketAddr,
    state: Shared<M, R>,
) -> Result<(), CliError> {
    let sweeper = tokio::spawn(sweep_sessions(state.clone()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server {
            message: format!("failed to bind {addr}: {e}"),
        })?;
    info!(%addr, static_dir = %state.static_dir.display(), "statusmail listening");

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.abort();
    result.map_err(|e| CliError::Server {
        message: e.to_string(),
    })
}

async fn sweep_sessions<M: MailSender, R: SessionRepository>(state: Shared<M, R>) {
    let mut tick = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        tick.tick().await;
        if let Err(e) = state.gate.purge_expired() {
            warn!(error = %e, "session sweep failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server");
}
