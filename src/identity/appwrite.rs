//! Appwrite-compatible REST client for the identity provider.

use super::{Account, IdentityError, IdentityProvider, Session};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use std::time::Duration;
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

const HEADER_PROJECT: &str = "X-Appwrite-Project";
const HEADER_KEY: &str = "X-Appwrite-Key";
const HEADER_SESSION: &str = "X-Appwrite-Session";

/// Error body returned by the provider on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "userId", default)]
    user_id: String,
    #[serde(default)]
    secret: String,
    #[serde(default)]
    expire: Option<String>,
}

/// Client for the provider's account and session endpoints.
///
/// Built once at startup and shared by every request.
#[derive(Clone)]
pub struct AppwriteClient {
    client: Client,
    endpoint: String,
    project: String,
    api_key: SecretString,
}

impl std::fmt::Debug for AppwriteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteClient")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("api_key", &"***")
            .finish()
    }
}

impl AppwriteClient {
    /// Build a client for `endpoint` (for example `https://cloud.appwrite.io/v1`).
    ///
    /// # Errors
    /// Returns an error if the endpoint is not an http(s) URL or the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        project: String,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self> {
        let parsed = Url::parse(endpoint)
            .with_context(|| format!("Invalid identity endpoint: {endpoint}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Identity endpoint must use http or https: {endpoint}"
            ));
        }
        if parsed.host_str().is_none() {
            return Err(anyhow!("Identity endpoint must include a host: {endpoint}"));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build identity HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project,
            api_key,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    /// Server-side request authenticated with the API key.
    fn admin(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(HEADER_PROJECT, &self.project)
            .header(HEADER_KEY, self.api_key.expose_secret())
    }

    /// Request acting on behalf of the session owner.
    fn with_session(&self, builder: RequestBuilder, secret: &SecretString) -> RequestBuilder {
        builder
            .header(HEADER_PROJECT, &self.project)
            .header(HEADER_SESSION, secret.expose_secret())
    }
}

/// Map a non-success response to an [`IdentityError`].
fn provider_error(status: StatusCode, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ProviderErrorBody>(body)
        .map(|body| body.message)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IdentityError::Unauthorized,
        StatusCode::CONFLICT => IdentityError::Conflict(message),
        StatusCode::BAD_REQUEST => IdentityError::Rejected(message),
        _ => IdentityError::Unavailable(format!("{status}, {message}")),
    }
}

async fn check_status(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(provider_error(status, &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| IdentityError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl IdentityProvider for AppwriteClient {
    #[instrument(skip(self, password))]
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, IdentityError> {
        let url = self.url("/account/sessions/email");
        let span = info_span!("identity.session.create", http.method = "POST", url = %url);

        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let response = self
            .admin(self.client.post(&url))
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let body: SessionBody = read_json(response).await?;
        if body.secret.is_empty() {
            // Secrets are only returned to server keys with the sessions.write scope.
            return Err(IdentityError::InvalidResponse(
                "session secret missing from response".to_string(),
            ));
        }

        debug!(session_id = %body.id, user_id = %body.user_id, "session created");

        Ok(Session {
            id: body.id,
            user_id: body.user_id,
            secret: SecretString::from(body.secret),
            expire: body.expire,
        })
    }

    #[instrument(skip(self, password))]
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<Account, IdentityError> {
        let url = self.url("/account");
        let span = info_span!("identity.account.create", http.method = "POST", url = %url);

        let payload = json!({
            "userId": user_id,
            "email": email,
            "password": password.expose_secret(),
            "name": name,
        });

        let response = self
            .admin(self.client.post(&url))
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        read_json(response).await
    }

    #[instrument(skip(self, secret))]
    async fn delete_session(
        &self,
        secret: &SecretString,
        session_id: &str,
    ) -> Result<(), IdentityError> {
        let url = self.url(&format!("/account/sessions/{session_id}"));
        let span = info_span!("identity.session.delete", http.method = "DELETE", url = %url);

        let response = self
            .with_session(self.client.delete(&url), secret)
            .send()
            .instrument(span)
            .await?;

        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self, secret))]
    async fn get_account(&self, secret: &SecretString) -> Result<Account, IdentityError> {
        let url = self.url("/account");
        let span = info_span!("identity.account.get", http.method = "GET", url = %url);

        let response = self
            .with_session(self.client.get(&url), secret)
            .send()
            .instrument(span)
            .await?;

        read_json(response).await
    }

    async fn ping(&self) -> Result<(), IdentityError> {
        let url = self.url("/health/version");
        let span = info_span!("identity.ping", http.method = "GET", url = %url);

        let response = self
            .client
            .get(&url)
            .header(HEADER_PROJECT, &self.project)
            .send()
            .instrument(span)
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::CURRENT_SESSION;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client_for(server: &MockServer) -> anyhow::Result<AppwriteClient> {
        AppwriteClient::new(
            &format!("{}/v1", server.uri()),
            "project-1".to_string(),
            SecretString::from("api-key".to_string()),
            Duration::from_secs(5),
        )
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn new_rejects_unsupported_scheme() {
        let result = AppwriteClient::new(
            "ftp://identity.example.com/v1",
            "p".to_string(),
            secret("k"),
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_trims_trailing_slash() -> anyhow::Result<()> {
        let client = AppwriteClient::new(
            "https://identity.example.com/v1/",
            "p".to_string(),
            secret("k"),
            Duration::from_secs(1),
        )?;
        assert_eq!(client.endpoint(), "https://identity.example.com/v1");
        assert!(!format!("{client:?}").contains("\"k\""));
        Ok(())
    }

    #[test]
    fn provider_error_maps_statuses() {
        assert!(matches!(
            provider_error(StatusCode::UNAUTHORIZED, ""),
            IdentityError::Unauthorized
        ));
        assert!(matches!(
            provider_error(
                StatusCode::CONFLICT,
                r#"{"message":"A user with the same id, email, or phone already exists.","code":409}"#
            ),
            IdentityError::Conflict(message) if message.contains("already exists")
        ));
        assert!(matches!(
            provider_error(StatusCode::BAD_REQUEST, r#"{"message":"Invalid password"}"#),
            IdentityError::Rejected(message) if message == "Invalid password"
        ));
        assert!(matches!(
            provider_error(StatusCode::BAD_GATEWAY, "not json"),
            IdentityError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn create_session_sends_server_key_and_returns_secret() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .and(header(HEADER_PROJECT, "project-1"))
            .and(header(HEADER_KEY, "api-key"))
            .and(body_json(json!({
                "email": "alice@example.com",
                "password": "password123"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "session-1",
                "userId": "user-1",
                "secret": "session-secret",
                "expire": "2026-11-17T00:00:00.000+00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let session = client
            .create_email_password_session("alice@example.com", &secret("password123"))
            .await?;

        assert_eq!(session.id, "session-1");
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.secret.expose_secret(), "session-secret");
        Ok(())
    }

    #[tokio::test]
    async fn create_session_without_secret_is_invalid() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "session-1",
                "userId": "user-1",
                "secret": ""
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client
            .create_email_password_session("alice@example.com", &secret("password123"))
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidResponse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn create_session_bad_credentials_is_unauthorized() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Invalid credentials. Please check the email and password.",
                "code": 401,
                "type": "user_invalid_credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client
            .create_email_password_session("alice@example.com", &secret("wrong-password"))
            .await;
        assert!(matches!(result, Err(IdentityError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn create_account_posts_profile() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account"))
            .and(header(HEADER_KEY, "api-key"))
            .and(body_json(json!({
                "userId": "user-1",
                "email": "bob@example.com",
                "password": "password123",
                "name": "Bob"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "$id": "user-1",
                "email": "bob@example.com",
                "name": "Bob",
                "status": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let account = client
            .create_account("user-1", "bob@example.com", &secret("password123"), "Bob")
            .await?;
        assert_eq!(account.id, "user-1");
        assert_eq!(account.email, "bob@example.com");
        assert_eq!(account.extra.get("status"), Some(&json!(true)));
        Ok(())
    }

    #[tokio::test]
    async fn create_account_conflict() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "A user with the same id, email, or phone already exists in this project.",
                "code": 409,
                "type": "user_already_exists"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client
            .create_account("user-1", "bob@example.com", &secret("password123"), "Bob")
            .await;
        assert!(matches!(result, Err(IdentityError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn get_account_uses_session_header() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .and(header(HEADER_PROJECT, "project-1"))
            .and(header(HEADER_SESSION, "session-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "$id": "user-1",
                "email": "alice@example.com",
                "name": "Alice"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let account = client.get_account(&secret("session-secret")).await?;
        assert_eq!(account.name, "Alice");

        let result = client.get_account(&secret("other-secret")).await;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn get_account_rejects_malformed_body() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let result = client.get_account(&secret("session-secret")).await;
        assert!(matches!(result, Err(IdentityError::InvalidResponse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_current_session() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/account/sessions/current"))
            .and(header(HEADER_SESSION, "session-secret"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        client
            .delete_session(&secret("session-secret"), CURRENT_SESSION)
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn ping_reports_unavailable_on_server_error() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/health/version"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        assert!(matches!(
            client.ping().await,
            Err(IdentityError::Unavailable(_))
        ));
        Ok(())
    }
}
