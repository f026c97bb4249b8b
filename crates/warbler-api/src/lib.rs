pub mod auth;
pub mod context;
pub mod csrf;
pub mod error;
pub mod home;
pub mod messages;
pub mod users;
pub mod views;

use std::sync::Arc;

use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use uuid::Uuid;

use warbler_crypto::PasswordScheme;
use warbler_db::Database;

pub use context::RequestContext;
pub use error::{ApiError, ApiResult};

pub const SESSION_COOKIE: &str = "warbler_session";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub passwords: Arc<dyn PasswordScheme>,
    pub config: ApiConfig,
}

/// Knobs the HTTP layer reads at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Reject form POSTs that lack the session's CSRF token. Off in tests.
    pub csrf_enabled: bool,
    pub secure_cookies: bool,
    /// Sessions expire after this many minutes without a request.
    pub session_minutes: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            csrf_enabled: true,
            secure_cookies: false,
            session_minutes: 24 * 60,
        }
    }
}

/// Every Warbler route, wrapped in the session and CSRF layers.
pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(
            state.config.session_minutes,
        )));

    Router::new()
        .route("/", get(home::homepage))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", get(users::edit_profile_page).post(users::edit_profile))
        .route("/users/delete", post(users::delete_account))
        .route("/users/follow/{user_id}", post(users::follow))
        .route("/users/stop-following/{user_id}", post(users::stop_following))
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/messages/new", get(messages::new_message_page).post(messages::new_message))
        .route("/messages/{message_id}", get(messages::show_message))
        .route("/messages/{message_id}/delete", post(messages::delete_message))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), csrf::verify_csrf))
        .layer(session_layer)
        .with_state(state)
}

/// `302 Found` to `location`. axum's `Redirect` only offers 303/307/308.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Path ids that are not UUIDs name nothing.
pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
