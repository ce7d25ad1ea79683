//! The displayed tip collection.
//!
//! Outside this crate the store is read-only. Loading replaces the whole
//! collection; engagement fields (`likes`, `liked_by`, `comments`) change
//! only through [`crate::mutation::MutationEngine`].

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::tips::Tip;

#[derive(Debug, Default)]
struct Inner {
    tips: Vec<Tip>,
    /// Bumped every time the whole collection is replaced
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TipStore {
    inner: Arc<RwLock<Inner>>,
}

impl TipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current collection, in display order
    pub async fn snapshot(&self) -> Vec<Tip> {
        self.inner.read().await.tips.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Tip> {
        self.inner.read().await.tips.iter().find(|t| t.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tips.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.tips.is_empty()
    }

    pub(crate) async fn replace_all(&self, tips: Vec<Tip>) {
        let mut inner = self.inner.write().await;
        inner.tips = tips;
        inner.generation += 1;
    }

    /// Replace the collection unless `is_current` says the data is stale.
    ///
    /// The check runs under the write lock.
    pub(crate) async fn replace_if<F>(&self, tips: Vec<Tip>, is_current: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let mut inner = self.inner.write().await;
        if !is_current() {
            return false;
        }
        inner.tips = tips;
        inner.generation += 1;
        true
    }

    /// Apply `f` to the tip with `id`, if present
    pub(crate) async fn update<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Tip) -> R,
    {
        let mut inner = self.inner.write().await;
        inner.tips.iter_mut().find(|t| t.id == id).map(f)
    }

    /// Like [`TipStore::update`], also returning the generation the tip was found in
    pub(crate) async fn update_tracked<F, R>(&self, id: &str, f: F) -> Option<(R, u64)>
    where
        F: FnOnce(&mut Tip) -> R,
    {
        let mut inner = self.inner.write().await;
        let generation = inner.generation;
        inner
            .tips
            .iter_mut()
            .find(|t| t.id == id)
            .map(|tip| (f(tip), generation))
    }

    /// Apply `f` only if the collection has not been replaced since `generation`
    pub(crate) async fn update_in_generation<F, R>(&self, id: &str, generation: u64, f: F) -> Option<R>
    where
        F: FnOnce(&mut Tip) -> R,
    {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            return None;
        }
        inner.tips.iter_mut().find(|t| t.id == id).map(f)
    }

    pub(crate) async fn remove(&self, id: &str) -> Option<Tip> {
        let mut inner = self.inner.write().await;
        let index = inner.tips.iter().position(|t| t.id == id)?;
        Some(inner.tips.remove(index))
    }
}
