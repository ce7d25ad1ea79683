//! Configuration options for the GardenGlow client

use std::env;
use std::time::Duration;

use gardenglow_auth::{AuthOptions, DEFAULT_AUTH_URL};
use url::Url;

use crate::error::{Error, Result};

/// Backend deployments the client can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// A development server on the local machine
    Local,
    /// The hosted community server
    Deployed,
}

impl Backend {
    /// Base URL of the deployment
    pub fn base_url(&self) -> &'static str {
        match self {
            Backend::Local => "http://localhost:3000",
            Backend::Deployed => "https://gardening-community-server-theta.vercel.app",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Backend::Local),
            "deployed" | "production" => Some(Backend::Deployed),
            _ => None,
        }
    }
}

/// Configuration options for the GardenGlow client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the tips REST API
    pub api_url: String,

    /// Request timeout applied to every call
    pub request_timeout: Option<Duration>,

    /// Base URL of the identity service
    pub auth_url: String,

    /// Web API key for the identity service
    pub auth_api_key: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: Backend::Deployed.base_url().to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            auth_api_key: String::new(),
        }
    }
}

impl ClientOptions {
    /// Set the API base URL
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.to_string();
        self
    }

    /// Point the client at one of the known deployments
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.api_url = backend.base_url().to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the identity service URL
    pub fn with_auth_url(mut self, value: &str) -> Self {
        self.auth_url = value.to_string();
        self
    }

    /// Set the identity service API key
    pub fn with_auth_api_key(mut self, value: &str) -> Self {
        self.auth_api_key = value.to_string();
        self
    }

    /// Build options from `GARDENGLOW_*` environment variables.
    ///
    /// `GARDENGLOW_API_URL` wins over `GARDENGLOW_BACKEND`. Unset variables
    /// keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(backend) = env::var("GARDENGLOW_BACKEND") {
            let backend = Backend::parse(&backend).ok_or_else(|| {
                Error::config(format!("unknown GARDENGLOW_BACKEND '{}'", backend))
            })?;
            options = options.with_backend(backend);
        }
        if let Ok(url) = env::var("GARDENGLOW_API_URL") {
            options = options.with_api_url(&url);
        }
        if let Ok(url) = env::var("GARDENGLOW_AUTH_URL") {
            options = options.with_auth_url(&url);
        }
        if let Ok(key) = env::var("GARDENGLOW_AUTH_API_KEY") {
            options = options.with_auth_api_key(&key);
        }
        if let Ok(secs) = env::var("GARDENGLOW_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::config(format!("invalid GARDENGLOW_TIMEOUT_SECS '{}'", secs)))?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        options.validate()?;
        Ok(options)
    }

    /// Check that both base URLs parse
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_url)?;
        Url::parse(&self.auth_url)?;
        Ok(())
    }

    /// Options for the identity provider client
    pub fn auth_options(&self) -> AuthOptions {
        AuthOptions {
            url: self.auth_url.clone(),
            api_key: self.auth_api_key.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_deployed_backend() {
        let options = ClientOptions::default();
        assert_eq!(options.api_url, Backend::Deployed.base_url());
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn backend_switch() {
        let options = ClientOptions::default().with_backend(Backend::Local);
        assert_eq!(options.api_url, "http://localhost:3000");
        assert_eq!(Backend::parse("LOCAL"), Some(Backend::Local));
        assert_eq!(Backend::parse("staging"), None);
    }

    #[test]
    fn invalid_url_rejected() {
        let options = ClientOptions::default().with_api_url("not a valid url");
        match options.validate() {
            Err(Error::Url(_)) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
    }
}
