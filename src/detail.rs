//! Single tip view

use log::{info, warn};

use crate::error::Error;
use crate::notice::Notifier;
use crate::store::TipStore;
use crate::tips::{Tip, TipsClient};

/// Outcome of loading a tip
#[derive(Debug)]
pub enum DetailView {
    Loaded(Tip),
    /// No tip with that id exists
    NotFound,
    Failed(Error),
}

/// Loads one tip into its own store so it can be liked and commented on
#[derive(Debug, Clone)]
pub struct TipDetail {
    tips: TipsClient,
    store: TipStore,
    notifier: Notifier,
}

impl TipDetail {
    pub fn new(tips: TipsClient, store: TipStore, notifier: Notifier) -> Self {
        Self {
            tips,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &TipStore {
        &self.store
    }

    pub async fn load(&self, id: &str) -> DetailView {
        match self.tips.get(id).await {
            Ok(Some(tip)) => {
                info!("Loaded tip {}", tip.id);
                self.store.replace_all(vec![tip.clone()]).await;
                DetailView::Loaded(tip)
            }
            Ok(None) => {
                info!("Tip {} not found", id);
                self.store.replace_all(Vec::new()).await;
                DetailView::NotFound
            }
            Err(e) => {
                warn!("Failed to load tip {}: {}", id, e);
                self.notifier.error("Error", "Failed to load tip details");
                DetailView::Failed(e)
            }
        }
    }
}
