//! Error handling for the GardenGlow client

use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

/// Path of the screen every failure view offers a way back to
pub const HOME_PATH: &str = "/";

/// Unified error type for the GardenGlow client
#[derive(Error, Debug)]
pub enum Error {
    /// The request never produced a response (connection, timeout, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http {
        status: u16,
        message: Option<String>,
    },

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Identity provider errors
    #[error("Authentication error: {0}")]
    Auth(#[from] gardenglow_auth::AuthError),

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The operation needs a signed-in user
    #[error("You need to be logged in")]
    NotAuthenticated,

    /// The signed-in user does not own the tip
    #[error("Only the author can modify tip {0}")]
    NotOwner(String),

    /// The tip is not part of the collection being mutated
    #[error("Unknown tip: {0}")]
    UnknownTip(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local storage errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// How a failure should be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureView {
    /// Expected: the resource does not exist
    NotFound { home: &'static str },
    /// Anything else
    Unexpected { message: String, home: &'static str },
}

impl Error {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Classify the error for a catch-all error screen
    pub fn failure_view(&self) -> FailureView {
        if self.is_not_found() {
            FailureView::NotFound { home: HOME_PATH }
        } else {
            FailureView::Unexpected {
                message: self.to_string(),
                home: HOME_PATH,
            }
        }
    }
}
