use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use statusmail_core::{IncidentReport, MailSender, SessionRepository};

use super::error::ApiError;
use super::gate;
use super::state::AppState;

pub const SENT: &str = "Email sent successfully!";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub async fn login<M: MailSender, R: SessionRepository>(
    State(state): State<Arc<AppState<M, R>>>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(req) = body?;
    let current = gate::session_id(&jar);

    let outcome = state
        .gate
        .login(current.as_ref(), &req.email, &req.password)?;
    let cookie = gate::session_cookie(
        outcome.session.id,
        state.gate.config().session_ttl,
        state.cookie_secure,
    );

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            redirect: outcome.redirect,
        }),
    ))
}

pub async fn logout<M: MailSender, R: SessionRepository>(
    State(state): State<Arc<AppState<M, R>>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Ack>), ApiError> {
    state
        .gate
        .logout(gate::session_id(&jar).as_ref())
        .map_err(|e| {
            error!(error = %e, "logout failed");
            ApiError::bare(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok((
        jar.remove(gate::removal_cookie()),
        Json(Ack {
            success: true,
            message: None,
        }),
    ))
}

pub async fn send_email<M: MailSender, R: SessionRepository>(
    State(state): State<Arc<AppState<M, R>>>,
    body: Result<Json<IncidentReport>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(report) = body?;
    state.notifier.notify(&report).await?;
    Ok(Json(Ack {
        success: true,
        message: Some(SENT),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
