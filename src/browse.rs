//! Browsing tips by filter criteria.
//!
//! Each refresh is numbered. A response is only applied if no newer
//! refresh has started since its request was sent, so a slow response for
//! old criteria never overwrites the list for newer ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::RwLock;

use crate::error::Error;
use crate::notice::Notifier;
use crate::store::TipStore;
use crate::tips::{Category, Difficulty, FilterCriteria, SortMode, TipsClient};

/// What the tip list shows after a refresh
#[derive(Debug)]
pub enum ListView {
    /// The store now holds this many tips
    Results(usize),
    /// The request succeeded with no matching tips
    Empty,
    /// A newer refresh started before this one finished; nothing changed
    Superseded,
    /// The request failed; the previous list is kept
    Failed(Error),
}

impl ListView {
    pub fn is_superseded(&self) -> bool {
        matches!(self, ListView::Superseded)
    }
}

/// List/filter controller owning the browse collection
#[derive(Debug, Clone)]
pub struct BrowseTips {
    tips: TipsClient,
    store: TipStore,
    criteria: Arc<RwLock<FilterCriteria>>,
    latest: Arc<AtomicU64>,
    settled: Arc<AtomicU64>,
    notifier: Notifier,
}

impl BrowseTips {
    pub fn new(tips: TipsClient, store: TipStore, notifier: Notifier) -> Self {
        Self {
            tips,
            store,
            criteria: Arc::new(RwLock::new(FilterCriteria::default())),
            latest: Arc::new(AtomicU64::new(0)),
            settled: Arc::new(AtomicU64::new(0)),
            notifier,
        }
    }

    /// The displayed tips
    pub fn store(&self) -> &TipStore {
        &self.store
    }

    /// Whether the newest refresh is still waiting for its response
    pub fn is_loading(&self) -> bool {
        self.latest.load(Ordering::SeqCst) > self.settled.load(Ordering::SeqCst)
    }

    pub async fn criteria(&self) -> FilterCriteria {
        *self.criteria.read().await
    }

    /// Replace the criteria, refetching when they changed or nothing was fetched yet
    pub async fn set_criteria(&self, criteria: FilterCriteria) -> Option<ListView> {
        {
            let mut current = self.criteria.write().await;
            let fetched = self.latest.load(Ordering::SeqCst) > 0;
            if fetched && *current == criteria {
                debug!("Filter criteria unchanged");
                return None;
            }
            *current = criteria;
        }
        Some(self.refresh().await)
    }

    pub async fn set_category(&self, category: Option<Category>) -> Option<ListView> {
        let criteria = self.criteria().await.with_category(category);
        self.set_criteria(criteria).await
    }

    pub async fn set_difficulty(&self, difficulty: Option<Difficulty>) -> Option<ListView> {
        let criteria = self.criteria().await.with_difficulty(difficulty);
        self.set_criteria(criteria).await
    }

    pub async fn set_sort(&self, sort: SortMode) -> Option<ListView> {
        let criteria = self.criteria().await.with_sort(sort);
        self.set_criteria(criteria).await
    }

    /// Fetch the list for the current criteria
    pub async fn refresh(&self) -> ListView {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let criteria = self.criteria().await;
        debug!("Fetching tips #{} for {:?}", seq, criteria);

        let is_current = || self.latest.load(Ordering::SeqCst) == seq;

        let result = self.tips.list(&criteria).await;
        self.settled.fetch_max(seq, Ordering::SeqCst);

        match result {
            Ok(tips) => {
                let count = tips.len();
                if !self.store.replace_if(tips, is_current).await {
                    warn!("Discarding superseded tip list #{}", seq);
                    return ListView::Superseded;
                }
                info!("Showing {} tips", count);
                if count == 0 {
                    ListView::Empty
                } else {
                    ListView::Results(count)
                }
            }
            Err(_) if !is_current() => {
                warn!("Discarding superseded tip list #{}", seq);
                ListView::Superseded
            }
            Err(e) => {
                warn!("Failed to fetch tips: {}", e);
                self.notifier.error("Error", "Failed to load tips");
                ListView::Failed(e)
            }
        }
    }
}
