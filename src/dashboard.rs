//! The signed-in user's own tips and dashboard overview

use log::{info, warn};

use crate::error::{Error, Result};
use crate::notice::Notifier;
use crate::session::{SessionIdentity, SessionStore};
use crate::store::TipStore;
use crate::tips::{DeleteConfirmation, NewTip, Tip, TipDraft, TipUpdate, TipsClient};
use crate::users::{UserProfile, UsersClient};

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, title: &str, text: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str, &str) -> bool,
{
    fn confirm(&self, title: &str, text: &str) -> bool {
        self(title, text)
    }
}

/// Outcome of [`MyTips::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent
    Cancelled,
    Deleted(DeleteConfirmation),
}

/// Totals shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_tips: u64,
    pub my_tips: usize,
    /// Likes received across the user's tips
    pub my_likes: u64,
    pub profile: Option<UserProfile>,
}

/// Tips owned by the signed-in user
#[derive(Debug, Clone)]
pub struct MyTips {
    tips: TipsClient,
    users: UsersClient,
    session: SessionStore,
    store: TipStore,
    notifier: Notifier,
}

impl MyTips {
    pub fn new(
        tips: TipsClient,
        users: UsersClient,
        session: SessionStore,
        store: TipStore,
        notifier: Notifier,
    ) -> Self {
        Self {
            tips,
            users,
            session,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &TipStore {
        &self.store
    }

    async fn identity(&self) -> Result<SessionIdentity> {
        self.session.identity().await.ok_or(Error::NotAuthenticated)
    }

    /// Load the user's tips into the store
    pub async fn load(&self) -> Result<usize> {
        let identity = self.identity().await?;
        match self.tips.my_tips(&identity.email).await {
            Ok(tips) => {
                let count = tips.len();
                self.store.replace_all(tips).await;
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load tips of {}: {}", identity.email, e);
                self.notifier.error("Error", "Failed to load your tips");
                Err(e)
            }
        }
    }

    /// Validate and publish a draft, then count it on the author's record
    pub async fn share(&self, draft: TipDraft) -> Result<Tip> {
        let identity = self.identity().await?;
        if let Err(e) = draft.validate() {
            self.notifier.warning(e.title(), &e.to_string());
            return Err(e.into());
        }

        let new_tip = NewTip::from_draft(
            draft,
            &identity.display_name,
            &identity.photo_url,
            &identity.email,
        );
        let result: Result<Tip> = async {
            let tip = self.tips.create(&new_tip).await?;
            self.users.record_tip_shared(&identity).await?;
            Ok(tip)
        }
        .await;

        match result {
            Ok(tip) => {
                self.notifier.success(
                    "Success! 🌱",
                    "Your gardening tip has been shared with the community",
                );
                Ok(tip)
            }
            Err(e) => {
                warn!("Sharing tip failed: {}", e);
                self.notifier.error(
                    "Error",
                    "Failed to share your gardening tip. Please try again.",
                );
                Err(e)
            }
        }
    }

    /// Change an owned tip
    pub async fn update(&self, id: &str, update: &TipUpdate) -> Result<Tip> {
        self.ensure_owner(id).await?;
        if let Err(e) = update.validate() {
            self.notifier.warning(e.title(), &e.to_string());
            return Err(e.into());
        }

        match self.tips.update(id, update).await {
            Ok(tip) => {
                info!("Updated tip {}", id);
                let fields = tip.clone();
                self.store
                    .update(id, move |current| {
                        current.title = fields.title;
                        current.topic = fields.topic;
                        current.description = fields.description;
                        current.category = fields.category;
                        current.difficulty = fields.difficulty;
                        current.image = fields.image;
                        current.availability = fields.availability;
                    })
                    .await;
                self.notifier.success("Success!", "Tip updated successfully");
                Ok(tip)
            }
            Err(e) => {
                warn!("Updating tip {} failed: {}", id, e);
                self.notifier.error("Error", "Failed to update tip");
                Err(e)
            }
        }
    }

    /// Delete an owned tip once `confirm` agrees
    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> Result<DeleteOutcome> {
        self.ensure_owner(id).await?;
        if !confirm.confirm("Are you sure?", "You won't be able to revert this!") {
            info!("Deletion of tip {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.tips.delete(id).await {
            Ok(confirmation) => {
                self.store.remove(id).await;
                self.notifier.success("Deleted!", "Your tip has been deleted.");
                Ok(DeleteOutcome::Deleted(confirmation))
            }
            Err(e) => {
                warn!("Deleting tip {} failed: {}", id, e);
                self.notifier.error("Error", "Failed to delete tip");
                Err(e)
            }
        }
    }

    /// Fetch the dashboard totals concurrently
    pub async fn stats(&self) -> Result<DashboardStats> {
        let identity = self.identity().await?;
        let result = tokio::try_join!(
            self.tips.count(),
            self.tips.my_tips(&identity.email),
            self.users.get(&identity.email),
        );

        match result {
            Ok((total_tips, mine, profile)) => Ok(DashboardStats {
                total_tips,
                my_tips: mine.len(),
                my_likes: mine.iter().map(|t| t.likes).sum(),
                profile,
            }),
            Err(e) => {
                warn!("Failed to load dashboard stats: {}", e);
                self.notifier.error("Error", "Failed to load dashboard stats.");
                Err(e)
            }
        }
    }

    /// The tip is fetched when it is not in the store
    async fn ensure_owner(&self, id: &str) -> Result<()> {
        let identity = self.identity().await?;
        let tip = match self.store.get(id).await {
            Some(tip) => tip,
            None => self
                .tips
                .get(id)
                .await?
                .ok_or_else(|| Error::UnknownTip(id.to_string()))?,
        };
        if tip.is_owned_by(&identity.email) {
            Ok(())
        } else {
            warn!("{} does not own tip {}", identity.email, id);
            Err(Error::NotOwner(id.to_string()))
        }
    }
}

/// Load the trending tips into `store`
pub async fn load_trending(tips: &TipsClient, store: &TipStore, notifier: &Notifier) -> Result<usize> {
    match tips.top().await {
        Ok(top) => {
            let count = top.len();
            store.replace_all(top).await;
            Ok(count)
        }
        Err(e) => {
            warn!("Failed to load trending tips: {}", e);
            notifier.error("Error", "Failed to load trending tips");
            Err(e)
        }
    }
}
