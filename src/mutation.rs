//! Optimistic like and comment mutations.
//!
//! Every mutation is tracked per tip id in a [`PendingMutations`] set shared
//! by all engines of one client. While a like for a tip is in flight further
//! likes for that tip are ignored, whichever engine they come from; other
//! tips proceed independently.
//! A like is applied to the [`TipStore`] before the request is sent, then
//! overwritten with the server's values on success or restored from a
//! snapshot on failure, unless the collection was reloaded meanwhile. Comments are only appended once the server has
//! accepted them.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::notice::Notifier;
use crate::session::SessionStore;
use crate::store::TipStore;
use crate::tips::{Comment, TipsClient};
use crate::validation::validate_comment;

/// Mutation state of a single tip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Pending,
}

/// Result of [`MutationEngine::toggle_like`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    /// Nobody is signed in; nothing was sent
    LoginRequired,
    /// A like for the same tip is already in flight; nothing was sent
    Ignored,
    /// The server's like state has been applied
    Reconciled { likes: u64, liked: bool },
}

/// Result of [`MutationEngine::submit_comment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    LoginRequired,
    Ignored,
    /// The comment was accepted; carries the new comment count
    Posted(usize),
}

type PendingSet = Arc<Mutex<HashSet<String>>>;

fn lock(set: &PendingSet) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a tip as pending until dropped
struct PendingGuard {
    set: PendingSet,
    id: String,
}

impl PendingGuard {
    fn acquire(set: &PendingSet, id: &str) -> Option<Self> {
        if !lock(set).insert(id.to_string()) {
            return None;
        }
        Some(Self {
            set: set.clone(),
            id: id.to_string(),
        })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.id);
    }
}

/// Tip ids with a like or comment in flight.
///
/// Clones share the same sets.
#[derive(Debug, Clone, Default)]
pub struct PendingMutations {
    liking: PendingSet,
    commenting: PendingSet,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Engagement fields captured before an optimistic like
struct LikeSnapshot {
    likes: u64,
    liked_by: BTreeSet<String>,
}

/// Applies likes and comments to a [`TipStore`]
#[derive(Debug, Clone)]
pub struct MutationEngine {
    tips: TipsClient,
    store: TipStore,
    session: SessionStore,
    notifier: Notifier,
    pending: PendingMutations,
}

impl MutationEngine {
    /// Engines given clones of the same `pending` never overlap on a tip
    pub fn new(
        tips: TipsClient,
        store: TipStore,
        session: SessionStore,
        pending: PendingMutations,
        notifier: Notifier,
    ) -> Self {
        Self {
            tips,
            store,
            session,
            notifier,
            pending,
        }
    }

    /// The collection this engine mutates
    pub fn store(&self) -> &TipStore {
        &self.store
    }

    /// Whether a like for `id` is in flight
    pub fn like_state(&self, id: &str) -> MutationState {
        if lock(&self.pending.liking).contains(id) {
            MutationState::Pending
        } else {
            MutationState::Idle
        }
    }

    /// Whether a comment for `id` is in flight
    pub fn comment_state(&self, id: &str) -> MutationState {
        if lock(&self.pending.commenting).contains(id) {
            MutationState::Pending
        } else {
            MutationState::Idle
        }
    }

    /// Like the tip, or remove the like if the signed-in user already liked it.
    ///
    /// On failure the tip is restored exactly and the error is returned.
    pub async fn toggle_like(&self, id: &str) -> Result<LikeOutcome> {
        let identity = match self.session.identity().await {
            Some(identity) => identity,
            None => {
                self.notifier.login_required("like tips");
                return Ok(LikeOutcome::LoginRequired);
            }
        };

        let _pending = match PendingGuard::acquire(&self.pending.liking, id) {
            Some(guard) => guard,
            None => {
                debug!("Like for tip {} already pending, ignoring", id);
                return Ok(LikeOutcome::Ignored);
            }
        };

        let email = identity.email.as_str();
        let (snapshot, generation) = self
            .store
            .update_tracked(id, |tip| {
                let snapshot = LikeSnapshot {
                    likes: tip.likes,
                    liked_by: tip.liked_by.clone(),
                };
                if tip.liked_by.remove(email) {
                    tip.likes = tip.likes.saturating_sub(1);
                } else {
                    tip.liked_by.insert(email.to_string());
                    tip.likes += 1;
                }
                snapshot
            })
            .await
            .ok_or_else(|| Error::UnknownTip(id.to_string()))?;

        match self.tips.like(id, email).await {
            Ok(response) => {
                let liked = response.liked_by.contains(email);
                let likes = response.likes;
                self.store
                    .update(id, |tip| {
                        tip.likes = response.likes;
                        tip.liked_by = response.liked_by;
                    })
                    .await;
                info!("Tip {} reconciled at {} likes", id, likes);

                if liked {
                    self.notifier.success("Liked!", "You have liked this tip");
                } else {
                    self.notifier.success("Unliked!", "You have removed your like");
                }
                Ok(LikeOutcome::Reconciled { likes, liked })
            }
            Err(e) => {
                let restored = self
                    .store
                    .update_in_generation(id, generation, |tip| {
                        tip.likes = snapshot.likes;
                        tip.liked_by = snapshot.liked_by;
                    })
                    .await;
                if restored.is_some() {
                    warn!("Like for tip {} failed, rolled back: {}", id, e);
                } else {
                    warn!("Like for tip {} failed; tips were reloaded meanwhile: {}", id, e);
                }
                self.notifier
                    .error("Error", "Failed to update like status. Please try again.");
                Err(e)
            }
        }
    }

    /// Post a comment as the signed-in user.
    ///
    /// Blank text is rejected before any request. The tip's comments are
    /// replaced with the server's list once accepted.
    pub async fn submit_comment(&self, id: &str, text: &str) -> Result<CommentOutcome> {
        let identity = match self.session.identity().await {
            Some(identity) => identity,
            None => {
                self.notifier.login_required("comment");
                return Ok(CommentOutcome::LoginRequired);
            }
        };

        let text = match validate_comment(text) {
            Ok(text) => text,
            Err(e) => {
                self.notifier.warning(e.title(), &e.to_string());
                return Err(e.into());
            }
        };

        let _pending = match PendingGuard::acquire(&self.pending.commenting, id) {
            Some(guard) => guard,
            None => {
                debug!("Comment for tip {} already pending, ignoring", id);
                return Ok(CommentOutcome::Ignored);
            }
        };

        let comment = Comment {
            user_email: identity.email,
            user_name: identity.display_name,
            user_photo: Some(identity.photo_url),
            comment: text.to_string(),
            date: Utc::now(),
        };

        match self.tips.comment(id, &comment).await {
            Ok(response) => {
                let count = response.comments.len();
                let applied = self
                    .store
                    .update(id, |tip| tip.comments = response.comments)
                    .await;
                if applied.is_none() {
                    debug!("Tip {} is not displayed, comment list dropped", id);
                }
                self.notifier.success("Success!", "Comment added successfully");
                Ok(CommentOutcome::Posted(count))
            }
            Err(e) => {
                warn!("Comment on tip {} failed: {}", id, e);
                self.notifier.error("Error", "Failed to add comment");
                Err(e)
            }
        }
    }
}
