use super::auth::{AuthState, current_account, require_account};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

/// Home page gate: signed-in accounts get a greeting, anyone else is sent to sign-in.
pub async fn root(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let account = current_account(&headers, auth_state.provider()).await;

    match require_account(account, auth_state.config()) {
        Ok(account) => Json(json!({
            "name": account.name,
            "email": account.email,
        }))
        .into_response(),
        Err(redirect) => redirect.into_response(),
    }
}
