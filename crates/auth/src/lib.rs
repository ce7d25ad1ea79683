//! Identity provider client for GardenGlow
//!
//! This crate talks to the Identity Toolkit REST API that backs the
//! community's accounts: email/password sign-up and sign-in, federated
//! sign-in, and profile updates. The provider is exposed behind the
//! [`IdentityProvider`] trait so that session handling can be driven by
//! any implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Default Identity Toolkit endpoint
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";

/// Token lifetime assumed when the provider omits `expiresIn`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Error type for identity provider calls
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("The provider returned an account without an email address")]
    MissingEmail,
}

impl AuthError {
    /// Whether the provider rejected the supplied credentials
    pub fn is_invalid_credentials(&self) -> bool {
        match self {
            AuthError::Api { message, .. } => {
                let code = message.split(':').next().unwrap_or_default().trim();
                matches!(
                    code,
                    "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS"
                )
            }
            _ => false,
        }
    }
}

/// Account details returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Federated sign-in providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    /// Provider id understood by the Identity Toolkit
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Github => "github.com",
        }
    }

    /// Human readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Github => "GitHub",
        }
    }
}

/// Client options
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Base URL of the identity service
    pub url: String,
    /// Web API key sent as the `key` query parameter
    pub api_key: String,
    /// Request URI reported for federated sign-in
    pub request_uri: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_AUTH_URL.to_string(),
            api_key: String::new(),
            request_uri: "http://localhost".to_string(),
        }
    }
}

/// Capabilities the application needs from an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account with email and password
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Sign in with an id token issued by a federated provider
    async fn sign_in_with_idp(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Update the display name and/or photo of the signed-in account
    async fn update_profile(
        &self,
        session: &AuthSession,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<AuthUser, AuthError>;

    /// End the session
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

impl TokenResponse {
    /// The email is taken from the response, else from `fallback_email`
    fn into_session(self, fallback_email: Option<&str>) -> Result<AuthSession, AuthError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .or_else(|| fallback_email.map(str::to_string))
            .ok_or(AuthError::MissingEmail)?;

        Ok(AuthSession {
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: expiry(self.expires_in.as_deref()),
            user: AuthUser {
                uid: self.local_id,
                email,
                display_name: self.display_name.filter(|s| !s.is_empty()),
                photo_url: self.photo_url.filter(|s| !s.is_empty()),
            },
        })
    }
}

/// Expiry for an `expiresIn` value in seconds; unusable values get the default lifetime
fn expiry(expires_in: Option<&str>) -> DateTime<Utc> {
    let now = Utc::now();
    expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|secs| *secs > 0)
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or_else(|| now + Duration::seconds(DEFAULT_EXPIRES_IN))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

/// Identity Toolkit REST client
#[derive(Debug, Clone)]
pub struct FirebaseAuth {
    url: String,
    api_key: String,
    request_uri: String,
    http_client: Client,
}

impl FirebaseAuth {
    /// Create a new client
    pub fn new(options: AuthOptions, http_client: Client) -> Self {
        Self {
            url: options.url.trim_end_matches('/').to_string(),
            api_key: options.api_key,
            request_uri: options.request_uri,
            http_client,
        }
    }

    /// The base URL requests are sent to
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, AuthError> {
        let url = format!("{}/v1/accounts:{}", self.url, method);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("accounts:{} failed with status {}", method, status);
            return Err(match serde_json::from_str::<ErrorEnvelope>(&error_text) {
                Ok(envelope) => AuthError::Api {
                    code: envelope.error.code,
                    message: envelope.error.message,
                },
                Err(_) => AuthError::Api {
                    code: status.as_u16(),
                    message: error_text,
                },
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let response: TokenResponse = self.call("signUp", body).await?;
        info!("Signed up {}", email);
        response.into_session(Some(email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        });
        let response: TokenResponse = self.call("signInWithPassword", body).await?;
        info!("Signed in {}", email);
        response.into_session(Some(email))
    }

    async fn sign_in_with_idp(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<AuthSession, AuthError> {
        let post_body = format!(
            "id_token={}&providerId={}",
            urlencoding::encode(id_token),
            provider.provider_id()
        );
        let body = json!({
            "postBody": post_body,
            "requestUri": self.request_uri,
            "returnIdpCredential": true,
            "returnSecureToken": true
        });
        let response: TokenResponse = self.call("signInWithIdp", body).await?;
        let session = response.into_session(None)?;
        info!("Signed in {} with {}", session.user.email, provider.provider_id());
        Ok(session)
    }

    async fn update_profile(
        &self,
        session: &AuthSession,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        let mut body = json!({
            "idToken": session.id_token,
            "returnSecureToken": false
        });
        if let Some(name) = display_name {
            body["displayName"] = Value::String(name.to_string());
        }
        if let Some(photo) = photo_url {
            body["photoUrl"] = Value::String(photo.to_string());
        }

        let response: UpdateResponse = self.call("update", body).await?;
        Ok(AuthUser {
            uid: response.local_id,
            email: response.email.unwrap_or_else(|| session.user.email.clone()),
            display_name: response.display_name.filter(|s| !s.is_empty()),
            photo_url: response.photo_url.filter(|s| !s.is_empty()),
        })
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        // Tokens are bearer-only; signing out just forgets them.
        info!("Signed out {}", session.user.email);
        Ok(())
    }
}
