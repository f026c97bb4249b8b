use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use tracing::warn;

use warbler_crypto::token;

use uuid::Uuid;

use crate::context::{CSRF_KEY, CURR_USER_KEY};
use crate::{ApiError, ApiResult, AppState};

/// Largest form body buffered for token inspection.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Paths that accept POSTs from anonymous sessions.
const ANONYMOUS_FORMS: [&str; 2] = ["/login", "/signup"];

/// Reject POSTs whose `csrf_token` form field does not match the token
/// stored in the session. Disabled by `ApiConfig::csrf_enabled`.
///
/// Anonymous POSTs to routes that need a login pass through untouched: their
/// handlers answer with a redirect and change nothing.
pub async fn verify_csrf(
    State(state): State<AppState>,
    session: Session,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    if !state.config.csrf_enabled || req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let logged_in = session.get::<Uuid>(CURR_USER_KEY).await?.is_some();
    if !logged_in && !ANONYMOUS_FORMS.contains(&req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let expected: Option<String> = session.get(CSRF_KEY).await?;

    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable form body: {e}")))?;

    let supplied = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == "csrf_token")
        .map(|(_, value)| value.into_owned());

    match (expected, supplied) {
        (Some(expected), Some(supplied)) if token::tokens_match(&expected, &supplied) => {}
        _ => {
            warn!("Rejected {} {}: CSRF token missing or invalid", parts.method, parts.uri);
            return Err(ApiError::Csrf);
        }
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
