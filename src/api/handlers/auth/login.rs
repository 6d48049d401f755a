//! Sign-in endpoint.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    state::AuthState,
    types::{ErrorResponse, LoginRequest, LoginResponse},
    utils::{MSG_PROVIDER_UNAVAILABLE, error_response, remote_failure_status, with_session_cookie},
    validation::validate_login,
};
use crate::identity::IdentityError;

/// Shared by every sign-in failure that could reveal whether an email is registered.
pub(super) const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created, session cookie set", body = LoginResponse),
        (status = 400, description = "Malformed credentials", body = ErrorResponse),
        (status = 401, description = "Credentials rejected by the identity provider", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("login payload rejected: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_CREDENTIALS);
        }
    };

    let credentials = match validate_login(&request, auth_state.config().password_policy()) {
        Ok(credentials) => credentials,
        Err(errors) => {
            // Field names only; the response itself stays generic.
            debug!(fields = ?errors.field_names().collect::<Vec<_>>(), "login validation failed");
            return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_CREDENTIALS);
        }
    };

    match auth_state
        .provider()
        .create_email_password_session(&credentials.email, &credentials.password)
        .await
    {
        Ok(session) => with_session_cookie(
            auth_state.config(),
            &session.secret,
            StatusCode::OK,
            LoginResponse {
                success: true,
                email: credentials.email,
            },
        ),
        Err(err @ (IdentityError::Unauthorized | IdentityError::Rejected(_))) => {
            debug!("login rejected by identity provider: {err}");
            error_response(remote_failure_status(&err), MSG_INVALID_CREDENTIALS)
        }
        Err(err) => {
            error!("Failed to create session: {err}");
            error_response(remote_failure_status(&err), MSG_PROVIDER_UNAVAILABLE)
        }
    }
}
