//! Session cookie handling and the route guards built on [`SessionGate`].
//!
//! [`SessionGate`]: statusmail_core::SessionGate

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use percent_encoding::percent_decode_str;

use statusmail_core::{Access, Denial, MailSender, ResourceKind, SessionId, SessionRepository};

use super::error::ApiError;
use super::state::AppState;

pub const SESSION_COOKIE: &str = "statusmail.sid";

/// The gated form page inside the static directory.
pub const FORM_PAGE: &str = "index.html";

/// The session id the client presented, if it parses.
pub fn session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

pub fn session_cookie(id: SessionId, ttl: Duration, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Matches the attributes of [`session_cookie`] so browsers drop it.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Guard for JSON endpoints: anonymous callers get a 401.
pub async fn require_api_session<M: MailSender, R: SessionRepository>(
    State(state): State<Arc<AppState<M, R>>>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    enforce(&state, &jar, ResourceKind::Api, req, next).await
}

/// Guard for every request that would resolve to the form page.
///
/// The static file service decodes percent escapes and skips empty and `.`
/// segments, so `/%69ndex.html` and `//index.html` reach the same file as
/// `/index.html`. Those spellings must not bypass the session check.
pub async fn require_form_page_session<M: MailSender, R: SessionRepository>(
    State(state): State<Arc<AppState<M, R>>>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    if targets_form_page(req.uri().path()) {
        return enforce(&state, &jar, ResourceKind::Page, req, next).await;
    }
    next.run(req).await
}

/// Whether `path`, normalized the way the static file service resolves it,
/// names the form page or the site root.
pub fn targets_form_page(path: &str) -> bool {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let mut segments = decoded
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".");
    match (segments.next(), segments.next()) {
        (None, _) => true,
        (Some(name), None) => name.eq_ignore_ascii_case(FORM_PAGE),
        _ => false,
    }
}

async fn enforce<M: MailSender, R: SessionRepository>(
    state: &AppState<M, R>,
    jar: &CookieJar,
    kind: ResourceKind,
    req: Request,
    next: Next,
) -> Response {
    match state.gate.guard(session_id(jar).as_ref(), kind) {
        Access::Allow => next.run(req).await,
        Access::Deny(Denial::Redirect(to)) => Redirect::to(&to).into_response(),
        Access::Deny(Denial::Unauthorized) => ApiError::unauthorized().into_response(),
    }
}
