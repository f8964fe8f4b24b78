use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use crate::auth::dto::ApiResponse;

/// Everything that can go wrong inside the auth domain.
///
/// The display strings are what clients see in the error envelope; they
/// never identify which check failed. The specific cause is logged
/// server-side in `into_response`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to decode request")]
    InvalidRequest,
    #[error("failed to authentication")]
    Unauthenticated,
    #[error("invalid authorization")]
    InvalidAuthorization,
    #[error("access not allowed")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid link")]
    LinkNotFound,
    #[error("link is deprecated")]
    LinkExpired,
    #[error("user with this email or phone already exists")]
    UserExists,
    #[error("bad password")]
    BadPassword,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid authorization")]
    WrongUserRole,
    #[error("empty name")]
    EmptyName,
    #[error("phone is empty")]
    EmptyPhone,
    #[error("email is empty")]
    EmptyEmail,
    #[error("empty contact info")]
    EmptyContact,
    #[error("empty link")]
    EmptyLink,
    #[error("empty user")]
    EmptyUserId,
    #[error("invalid email")]
    InvalidEmail,
    #[error("internal error")]
    Store(#[from] sqlx::Error),
    #[error("user register failed")]
    Hash,
    #[error("failed to authentication")]
    Token,
    #[error("failed to send email")]
    Notify,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidRequest
            | AuthError::BadPassword
            | AuthError::EmptyName
            | AuthError::EmptyPhone
            | AuthError::EmptyEmail
            | AuthError::EmptyContact
            | AuthError::EmptyLink
            | AuthError::EmptyUserId
            | AuthError::InvalidEmail
            | AuthError::LinkExpired => StatusCode::BAD_REQUEST,
            AuthError::Unauthenticated
            | AuthError::InvalidAuthorization
            | AuthError::InvalidCredentials
            | AuthError::WrongUserRole
            | AuthError::Token => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::UserNotFound | AuthError::LinkNotFound => StatusCode::NOT_FOUND,
            AuthError::UserExists => StatusCode::CONFLICT,
            AuthError::Notify => StatusCode::BAD_GATEWAY,
            AuthError::Store(_) | AuthError::Hash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AuthError::Store(e) => error!(error = %e, "store failure"),
            AuthError::Hash => error!("password hashing failure"),
            AuthError::Notify => error!("notification sender failure"),
            other => warn!(cause = ?other, "request rejected"),
        }
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

/// Postgres unique-constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}
