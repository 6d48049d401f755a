//! Helpers shared by the login and register handlers.

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::Serialize;
use tracing::error;

use super::{session::session_cookie, state::AuthConfig, types::ErrorResponse};
use crate::identity::IdentityError;

pub(super) const MSG_PROVIDER_UNAVAILABLE: &str = "Identity service unavailable";

/// HTTP status used when a remote call fails during login or register.
pub(super) const fn remote_failure_status(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::Unauthorized => StatusCode::UNAUTHORIZED,
        IdentityError::Conflict(_) => StatusCode::CONFLICT,
        IdentityError::Rejected(_) => StatusCode::BAD_REQUEST,
        IdentityError::Unavailable(_) | IdentityError::InvalidResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub(super) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// Respond with `body` and the session cookie for `secret`.
pub(super) fn with_session_cookie<T: Serialize>(
    config: &AuthConfig,
    secret: &SecretString,
    status: StatusCode,
    body: T,
) -> Response {
    let cookie = match session_cookie(config, secret) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to start session");
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    (status, headers, Json(body)).into_response()
}
