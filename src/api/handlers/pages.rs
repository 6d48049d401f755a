//! Sign-in and sign-up page gates.
//!
//! The forms themselves are rendered by the frontend. These routes only answer
//! whether the form should be shown (`204`) or the visitor sent home (`303`).

use super::auth::{AuthState, current_account, require_anonymous};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

async fn anonymous_only(headers: &HeaderMap, auth_state: &AuthState) -> Response {
    let account = current_account(headers, auth_state.provider()).await;

    match require_anonymous(account.as_ref(), auth_state.config()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(redirect) => redirect.into_response(),
    }
}

pub async fn sign_in(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    anonymous_only(&headers, &auth_state).await
}

pub async fn sign_up(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    anonymous_only(&headers, &auth_state).await
}
