//! Route protection gated on the session.
//!
//! [`decide`] is the pure decision. [`RouteGuard`] applies it to the live
//! session and remembers the attempted path so login can resume there.

mod slot;

use std::sync::Arc;

use log::{info, warn};

use crate::error::Result;
use crate::session::{SessionState, SessionStore};

pub use slot::{FileSlot, MemorySlot, RedirectSlot, REDIRECT_SLOT_KEY};

/// Where anonymous users are sent
pub const LOGIN_PATH: &str = "/auth/login";

/// Where login lands when no path was remembered
pub const DEFAULT_RESUME_PATH: &str = "/";

/// Paths that need a signed-in user; `:id` matches any single segment
pub const PROTECTED_PATHS: [&str; 6] = [
    "/share-tip",
    "/my-tips",
    "/explore-gardeners",
    "/tip-details/:id",
    "/update-tip/:id",
    "/dashboard",
];

/// Outcome of guarding a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// The session is still loading; show a neutral waiting state
    Wait,
    Redirect { to: &'static str, remember: String },
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut patterns = pattern.trim_end_matches('/').split('/');
    let mut segments = path.trim_end_matches('/').split('/');
    loop {
        match (patterns.next(), segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') && !s.is_empty() => {}
            (Some(p), Some(s)) if p == s => {}
            _ => return false,
        }
    }
}

/// Whether `path` is one of [`PROTECTED_PATHS`]
pub fn requires_login(path: &str) -> bool {
    PROTECTED_PATHS.iter().any(|p| matches_pattern(p, path))
}

/// Decide whether `path` may be shown in the given session state
pub fn decide(requires_identity: bool, state: &SessionState, path: &str) -> GuardDecision {
    if !requires_identity {
        return GuardDecision::Allow;
    }
    match state {
        SessionState::Loading => GuardDecision::Wait,
        SessionState::Authenticated(_) => GuardDecision::Allow,
        SessionState::Anonymous => GuardDecision::Redirect {
            to: LOGIN_PATH,
            remember: path.to_string(),
        },
    }
}

/// Applies [`decide`] to the live session
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
    slot: Arc<dyn RedirectSlot>,
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl RouteGuard {
    pub fn new(session: SessionStore, slot: Arc<dyn RedirectSlot>) -> Self {
        Self { session, slot }
    }

    /// Guard `path` against the current state. A redirect stores the path.
    pub async fn check(&self, path: &str) -> Result<GuardDecision> {
        let state = self.session.state().await;
        self.apply(decide(requires_login(path), &state, path))
    }

    /// Like [`RouteGuard::check`], but waits out the loading state
    pub async fn check_when_ready(&self, path: &str) -> Result<GuardDecision> {
        let mut changes = self.session.subscribe();
        let mut state = self.session.state().await;
        while state.is_loading() {
            match changes.changed().await {
                Some(next) => state = next,
                None => break,
            }
        }
        self.apply(decide(requires_login(path), &state, path))
    }

    /// Remember where to go after login, for actions that prompt a login
    pub fn remember(&self, path: &str) -> Result<()> {
        info!("Will resume at {} after login", path);
        self.slot.set(REDIRECT_SLOT_KEY, path)
    }

    /// Consume the remembered path, falling back to `/`
    pub fn resume_path(&self) -> String {
        match self.slot.take(REDIRECT_SLOT_KEY) {
            Ok(Some(path)) => path,
            Ok(None) => DEFAULT_RESUME_PATH.to_string(),
            Err(e) => {
                warn!("Failed to read resume path: {}", e);
                DEFAULT_RESUME_PATH.to_string()
            }
        }
    }

    fn apply(&self, decision: GuardDecision) -> Result<GuardDecision> {
        if let GuardDecision::Redirect { remember, .. } = &decision {
            self.remember(remember)?;
        }
        Ok(decision)
    }
}
