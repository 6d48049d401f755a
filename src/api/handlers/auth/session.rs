//! Session cookie handling, the session guard and the logout endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    state::{AuthConfig, AuthState},
    types::{AccountResponse, LogoutResponse},
};
use crate::identity::{Account, CURRENT_SESSION, IdentityProvider};

pub(crate) const SESSION_COOKIE_NAME: &str = "session";

/// Resolve the session cookie into the provider's account.
///
/// Returns `None` when the cookie is missing or malformed (without contacting
/// the provider) and when the provider rejects the session or cannot be reached.
/// Failures are logged, never propagated.
pub async fn current_account(
    headers: &HeaderMap,
    provider: &dyn IdentityProvider,
) -> Option<Account> {
    let secret = extract_session_secret(headers)?;
    match provider.get_account(&secret).await {
        Ok(account) => Some(account),
        Err(err) => {
            error!("Failed to resolve session account: {err}");
            None
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/current",
    responses(
        (status = 200, description = "Session is active", body = AccountResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn current(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    match current_account(&headers, auth_state.provider()).await {
        Some(account) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(headers, auth_state))]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    if let Some(secret) = extract_session_secret(&headers) {
        if let Err(err) = auth_state
            .provider()
            .delete_session(&secret, CURRENT_SESSION)
            .await
        {
            error!("Failed to delete session: {err}");
        }
    } else {
        debug!("logout without session cookie");
    }

    // Always clear the cookie, even if the remote session could not be deleted.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie() {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }

    (
        StatusCode::OK,
        response_headers,
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}

/// Build the `HttpOnly` cookie carrying the provider session secret.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    secret: &SecretString,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut value = HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={ttl_seconds}",
        secret.expose_secret()
    ))?;
    value.set_sensitive(true);
    Ok(value)
}

pub(crate) fn clear_session_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0"
    ))
}

/// Read the session secret from the `Cookie` header.
///
/// Empty values and values with characters outside the cookie-octet range are
/// skipped; a later well-formed `session` pair still counts.
pub(crate) fn extract_session_secret(headers: &HeaderMap) -> Option<SecretString> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() != SESSION_COOKIE_NAME {
                continue;
            }
            let val = val.trim();
            if val.is_empty() || !val.bytes().all(is_cookie_octet) {
                continue;
            }
            return Some(SecretString::from(val.to_string()));
        }
    }
    None
}

const fn is_cookie_octet(byte: u8) -> bool {
    byte.is_ascii_graphic() && !matches!(byte, b'"' | b',' | b';' | b'\\')
}
