use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use warbler_db::DbError;

use crate::views;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures that end a request with an error page. Missing logins and
/// foreign resources are not errors: handlers answer those with a redirect.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("CSRF token missing or invalid")]
    Csrf,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found())).into_response(),
            ApiError::Csrf => (
                StatusCode::BAD_REQUEST,
                "Bad Request: the CSRF token is missing or invalid.",
            )
                .into_response(),
            ApiError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, format!("Bad Request: {reason}")).into_response()
            }
            err => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
