//! Auth service client
//!
//! This module provides the user record type and an HTTP client for fetching
//! the currently authenticated user from the auth service's `/api/auth/me`
//! endpoint.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of the current-user endpoint, relative to the service base URL
const ME_PATH: &str = "/api/auth/me";

/// The authenticated user record returned by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: String,
    /// Email address the account is registered under
    pub email: String,
    /// Display name, if the user has set one
    #[serde(default)]
    pub full_name: Option<String>,
    /// Role assigned to the account
    #[serde(default)]
    pub role: UserRole,
}

/// Roles an account can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// Errors that can occur when fetching the current user
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse the user record in the response
    #[error("Failed to parse user response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The service rejected the request as unauthenticated (HTTP 401)
    #[error("Not authenticated")]
    Unauthenticated,

    /// The service answered with a status the client does not handle
    #[error("Auth service returned unexpected status {status}")]
    UnexpectedStatus { status: u16 },
}

impl AuthError {
    /// Returns true if this error means the caller is signed out rather than
    /// that the fetch itself broke.
    ///
    /// Covers both the explicit [`AuthError::Unauthenticated`] variant and a
    /// 401 status carried inside a transport error.
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            AuthError::Unauthenticated => true,
            AuthError::RequestFailed(err) => err.status() == Some(StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }
}

/// Client for fetching the current user from the auth service
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl AuthClient {
    /// Creates a new AuthClient for the given service base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Creates a new AuthClient with a custom HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Sets the bearer token sent with each request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Fetches the currently authenticated user
    ///
    /// # Returns
    /// * `Ok(User)` - The signed-in user record
    /// * `Err(AuthError::Unauthenticated)` - If the service answered 401
    /// * `Err(AuthError)` - If the request or parsing fails
    pub async fn fetch_current_user(&self) -> Result<User, AuthError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), ME_PATH);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let text = response.text().await?;
                let user: User = serde_json::from_str(&text)?;
                Ok(user)
            }
            StatusCode::UNAUTHORIZED => Err(AuthError::Unauthenticated),
            status => Err(AuthError::UnexpectedStatus {
                status: status.as_u16(),
            }),
        }
    }
}
