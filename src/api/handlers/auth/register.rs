//! Sign-up endpoint. A successful sign-up also signs the new account in.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use ulid::Ulid;

use super::{
    state::AuthState,
    types::{ErrorResponse, RegisterRequest, RegisterResponse},
    utils::{MSG_PROVIDER_UNAVAILABLE, error_response, with_session_cookie},
    validation::validate_register,
};
use crate::identity::IdentityError;

const MSG_INVALID_REGISTRATION: &str = "Invalid registration details";
const MSG_ACCOUNT_EXISTS: &str = "An account with this email already exists";

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and signed in, session cookie set", body = RegisterResponse),
        (status = 400, description = "Invalid registration details", body = ErrorResponse),
        (status = 409, description = "Account already exists", body = ErrorResponse),
        (status = 502, description = "Identity provider unavailable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("register payload rejected: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, MSG_INVALID_REGISTRATION);
        }
    };

    let registration = match validate_register(&request, auth_state.config().password_policy()) {
        Ok(registration) => registration,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(MSG_INVALID_REGISTRATION).with_errors(errors.into_fields())),
            )
                .into_response();
        }
    };

    let credentials = &registration.credentials;
    let user_id = Ulid::new().to_string();

    let account = match auth_state
        .provider()
        .create_account(
            &user_id,
            &credentials.email,
            &credentials.password,
            &registration.name,
        )
        .await
    {
        Ok(account) => account,
        Err(err @ IdentityError::Conflict(_)) => {
            debug!("register conflict: {err}");
            return error_response(StatusCode::CONFLICT, MSG_ACCOUNT_EXISTS);
        }
        Err(IdentityError::Rejected(message)) => {
            debug!("register rejected by identity provider: {message}");
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
        Err(err) => {
            // Unauthorized here means the server key was refused, not the visitor.
            error!("Failed to create account: {err}");
            return error_response(StatusCode::BAD_GATEWAY, MSG_PROVIDER_UNAVAILABLE);
        }
    };

    info!(account_id = %account.id, "account created");

    match auth_state
        .provider()
        .create_email_password_session(&credentials.email, &credentials.password)
        .await
    {
        Ok(session) => with_session_cookie(
            auth_state.config(),
            &session.secret,
            StatusCode::OK,
            RegisterResponse {
                success: true,
                email: credentials.email.clone(),
                name: registration.name.clone(),
            },
        ),
        Err(err) => {
            // The account exists; the user can still sign in manually.
            warn!(account_id = %account.id, "Failed to create session after sign-up: {err}");
            error_response(StatusCode::BAD_GATEWAY, MSG_PROVIDER_UNAVAILABLE)
        }
    }
}
