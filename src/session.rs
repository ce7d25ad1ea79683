//! Session observer.
//!
//! [`SessionStore`] is the single owner of the signed-in identity. It is
//! handed to the components that need it rather than living in a global,
//! and broadcasts every change to its subscribers.
//!
//! Subscribing: [`SessionStore::subscribe`] returns a
//! [`SessionSubscription`]; call [`SessionSubscription::changed`] to wait
//! for the next state. Unsubscribe with [`SessionSubscription::unsubscribe`]
//! or by dropping the subscription.

use std::fmt;
use std::sync::Arc;

use gardenglow_auth::{AuthSession, AuthUser, IdentityProvider, OAuthProvider};
use log::{debug, info, warn};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Photo used when an account has none
pub const DEFAULT_PHOTO_URL: &str = "https://i.ibb.co/5GzXkwq/user.png";

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Stable identity key
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
}

impl SessionIdentity {
    pub fn from_user(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            display_name: user.display_name.clone().unwrap_or_default(),
            photo_url: user
                .photo_url
                .clone()
                .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string()),
        }
    }
}

/// What is known about the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state has not been resolved yet
    Loading,
    Anonymous,
    Authenticated(SessionIdentity),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

struct Inner {
    state: SessionState,
    session: Option<AuthSession>,
}

/// Observable session store
#[derive(Clone)]
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    inner: Arc<RwLock<Inner>>,
    changes: broadcast::Sender<SessionState>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store in the `Loading` state
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            provider,
            inner: Arc::new(RwLock::new(Inner {
                state: SessionState::Loading,
                session: None,
            })),
            changes,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state.clone()
    }

    /// The signed-in identity, or `None` while anonymous or loading
    pub async fn identity(&self) -> Option<SessionIdentity> {
        self.inner.read().await.state.identity().cloned()
    }

    /// Tokens of the current session
    pub async fn auth_session(&self) -> Option<AuthSession> {
        self.inner.read().await.session.clone()
    }

    /// Receive every subsequent state change
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.changes.subscribe(),
        }
    }

    /// Settle the initial state from a restored session, if any.
    ///
    /// Expired sessions resolve to anonymous.
    pub async fn resolve(&self, session: Option<AuthSession>) -> SessionState {
        let session = session.filter(|s| {
            let expired = s.is_expired();
            if expired {
                info!("Restored session for {} has expired", s.user.email);
            }
            !expired
        });
        self.set(session).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        let session = self.provider.sign_up(email, password).await?;
        self.establish(session).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        let session = self.provider.sign_in(email, password).await?;
        self.establish(session).await
    }

    pub async fn sign_in_with_idp(
        &self,
        provider: OAuthProvider,
        id_token: &str,
    ) -> Result<SessionIdentity> {
        let session = self.provider.sign_in_with_idp(provider, id_token).await?;
        self.establish(session).await
    }

    /// Change the display name and/or photo of the signed-in account
    pub async fn update_profile(
        &self,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<SessionIdentity> {
        let mut session = self.auth_session().await.ok_or(Error::NotAuthenticated)?;
        let user = self
            .provider
            .update_profile(&session, display_name, photo_url)
            .await?;
        session.user = user;
        self.establish(session).await
    }

    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.auth_session().await {
            self.provider.sign_out(&session).await?;
        }
        self.set(None).await;
        Ok(())
    }

    async fn establish(&self, session: AuthSession) -> Result<SessionIdentity> {
        let identity = SessionIdentity::from_user(&session.user);
        self.set(Some(session)).await;
        Ok(identity)
    }

    async fn set(&self, session: Option<AuthSession>) -> SessionState {
        let state = match &session {
            Some(session) => SessionState::Authenticated(SessionIdentity::from_user(&session.user)),
            None => SessionState::Anonymous,
        };

        let mut inner = self.inner.write().await;
        inner.session = session;
        if inner.state != state {
            info!("Session state changing from {:?} to {:?}", inner.state, state);
            inner.state = state.clone();
            // No receivers is fine.
            if self.changes.send(state.clone()).is_err() {
                debug!("No session subscribers");
            }
        }
        state
    }
}

/// A live subscription to session changes
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionState>,
}

impl SessionSubscription {
    /// Wait for the next state. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        loop {
            match self.receiver.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session subscriber lagged, skipped {} changes", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving changes
    pub fn unsubscribe(self) {}
}
