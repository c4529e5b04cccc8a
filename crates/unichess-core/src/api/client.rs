//! API client for the unichess backend.
//!
//! This module provides the `ApiClient` struct for logging in, creating
//! accounts, and making bearer-authenticated user requests.

use std::time::Duration;

use anyhow::Result;
use reqwest::{multipart, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::login::{AuthApi, Credentials};
use crate::models::{LoginResponse, NewUser, User};
use crate::session::SessionToken;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// A timed-out login surfaces to the user as a network failure.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the unichess backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<SessionToken>,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: SessionToken) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a session token.
    ///
    /// Sends `username` and `password` as a multipart form body.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        let url = self.url("/users/login");
        debug!(url = %url, username = %credentials.username(), "Sending login request");

        let form = multipart::Form::new()
            .text("username", credentials.username().to_string())
            .text("password", credentials.password().to_string());

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = Self::check_response(response).await?;

        let body = response.text().await?;
        let login: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::MalformedResponse(format!("Failed to parse login response: {}", e))
        })?;

        login
            .access_token
            .and_then(SessionToken::new)
            .ok_or_else(|| ApiError::MalformedResponse("missing access_token".to_string()))
    }

    /// Create a new account
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let url = self.url("/users/");
        debug!(url = %url, email = %email, "Sending registration request");

        let body = NewUser {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;
        Self::decode(response).await
    }

    /// Look up a user by id. Requires a bearer token.
    pub async fn fetch_user(&self, uid: i64) -> Result<User, ApiError> {
        let url = self.url(&format!("/users/{}", uid));
        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token.as_str());
        }
        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        Self::decode(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(format!("Failed to parse response: {}", e)))
    }
}

impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        ApiClient::login(self, credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{serve_once, unreachable_url};
    use reqwest::StatusCode;

    fn alice(password: &str) -> Credentials {
        Credentials::new("alice", password)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/").expect("client");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/users/login"), "http://localhost:8000/users/login");
    }

    #[tokio::test]
    async fn test_login_success_sends_multipart_form() {
        let (url, server) =
            serve_once("200 OK", r#"{"access_token": "abc123", "token_type": "bearer"}"#).await;
        let client = ApiClient::new(url).expect("client");

        let token = client.login(&alice("secret")).await.expect("login succeeds");
        assert_eq!(token.as_str(), "abc123");

        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /users/login "));
        assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
        assert!(request.contains("name=\"username\"\r\n\r\nalice\r\n"));
        assert!(request.contains("name=\"password\"\r\n\r\nsecret\r\n"));
    }

    #[tokio::test]
    async fn test_login_empty_credentials_are_sent() {
        let (url, server) = serve_once("200 OK", r#"{"access_token": "t"}"#).await;
        let client = ApiClient::new(url).expect("client");

        client
            .login(&Credentials::new("", ""))
            .await
            .expect("login succeeds");

        let request = server.await.expect("server task");
        assert!(request.contains("name=\"username\"\r\n\r\n\r\n"));
        assert!(request.contains("name=\"password\"\r\n\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_login_rejected_with_detail() {
        let (url, _server) =
            serve_once("401 Unauthorized", r#"{"detail": "Incorrect credentials"}"#).await;
        let client = ApiClient::new(url).expect("client");

        let err = client.login(&alice("wrong")).await.expect_err("login fails");
        assert!(matches!(
            err,
            ApiError::Rejected { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
        assert_eq!(err.user_message(), "Incorrect credentials");
    }

    #[tokio::test]
    async fn test_login_rejected_without_json_uses_status_phrase() {
        let (url, _server) = serve_once("503 Service Unavailable", "upstream down").await;
        let client = ApiClient::new(url).expect("client");

        let err = client.login(&alice("secret")).await.expect_err("login fails");
        assert_eq!(err.user_message(), "Service Unavailable");
    }

    #[tokio::test]
    async fn test_login_success_without_token_is_malformed() {
        let (url, _server) = serve_once("200 OK", r#"{"token_type": "bearer"}"#).await;
        let client = ApiClient::new(url).expect("client");

        let err = client.login(&alice("secret")).await.expect_err("login fails");
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_login_success_with_non_json_is_malformed() {
        let (url, _server) = serve_once("200 OK", "<html>ok</html>").await;
        let client = ApiClient::new(url).expect("client");

        let err = client.login(&alice("secret")).await.expect_err("login fails");
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_login_network_failure() {
        let client = ApiClient::new(unreachable_url().await).expect("client");

        let err = client.login(&alice("secret")).await.expect_err("login fails");
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.user_message(), "Network error, please try again later");
    }

    #[tokio::test]
    async fn test_register_posts_json() {
        let (url, server) =
            serve_once("200 OK", r#"{"id": 7, "email": "alice@example.com"}"#).await;
        let client = ApiClient::new(url).expect("client");

        let user = client
            .register("alice@example.com", "secret")
            .await
            .expect("register succeeds");
        assert_eq!(user, User { id: 7, email: "alice@example.com".to_string() });

        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /users/ "));
        assert!(request.contains(r#""email":"alice@example.com""#));
    }

    #[tokio::test]
    async fn test_register_existing_email() {
        let (url, _server) = serve_once(
            "400 Bad Request",
            r#"{"detail": "An account with this email already exists"}"#,
        )
        .await;
        let client = ApiClient::new(url).expect("client");

        let err = client
            .register("alice@example.com", "secret")
            .await
            .expect_err("register fails");
        assert_eq!(err.user_message(), "An account with this email already exists");
    }

    #[tokio::test]
    async fn test_fetch_user_sends_bearer_token() {
        let (url, server) =
            serve_once("200 OK", r#"{"id": 7, "email": "alice@example.com"}"#).await;
        let token = SessionToken::new("abc123").expect("token");
        let client = ApiClient::new(url).expect("client").with_token(token);

        let user = client.fetch_user(7).await.expect("fetch succeeds");
        assert_eq!(user.id, 7);

        let request = server.await.expect("server task");
        assert!(request.starts_with("GET /users/7 "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer abc123"));
    }

    #[tokio::test]
    async fn test_fetch_user_not_found() {
        let (url, _server) = serve_once("404 Not Found", r#"{"detail": "User not found"}"#).await;
        let client = ApiClient::new(url).expect("client");

        let err = client.fetch_user(99).await.expect_err("fetch fails");
        assert_eq!(err.user_message(), "User not found");
    }
}
