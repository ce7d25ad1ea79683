//! Tip endpoints of the REST API

mod filter;
mod types;

use log::info;
use reqwest::Method;

use crate::error::Result;
use crate::fetch::ResourceClient;

pub use filter::*;
pub use types::*;

/// Client for `/tips`
#[derive(Debug, Clone)]
pub struct TipsClient {
    api: ResourceClient,
}

impl TipsClient {
    /// Create a new TipsClient
    pub fn new(api: ResourceClient) -> Self {
        Self { api }
    }

    /// List tips matching the filter criteria
    pub async fn list(&self, criteria: &FilterCriteria) -> Result<Vec<Tip>> {
        self.api.get("/tips").query(criteria.to_query()).execute().await
    }

    /// Fetch a single tip; `None` when the server has no tip with that id.
    ///
    /// Both a 404 and a `null` body mean the tip does not exist.
    pub async fn get(&self, id: &str) -> Result<Option<Tip>> {
        match self.api.get(&format!("/tips/{}", id)).execute().await {
            Ok(tip) => Ok(tip),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Total number of tips
    pub async fn count(&self) -> Result<u64> {
        let count: TipCount = self.api.get("/tips/count").execute().await?;
        Ok(count.count)
    }

    /// Trending tips
    pub async fn top(&self) -> Result<Vec<Tip>> {
        self.api.get("/tips/top").execute().await
    }

    /// Tips authored by `email`
    pub async fn my_tips(&self, email: &str) -> Result<Vec<Tip>> {
        self.api
            .get(&format!("/tips/my-tips/{}", email))
            .execute()
            .await
    }

    /// Publish a new tip
    pub async fn create(&self, tip: &NewTip) -> Result<Tip> {
        let created: Tip = self.api.post("/tips").json(tip)?.execute().await?;
        info!("Created tip {}", created.id);
        Ok(created)
    }

    /// Change some fields of a tip
    pub async fn update(&self, id: &str, update: &TipUpdate) -> Result<Tip> {
        self.api
            .patch(&format!("/tips/{}", id))
            .json(update)?
            .execute()
            .await
    }

    /// Remove a tip
    pub async fn delete(&self, id: &str) -> Result<DeleteConfirmation> {
        self.api.delete(&format!("/tips/{}", id)).execute().await
    }

    /// Toggle `user_email`'s like on a tip
    pub async fn like(&self, id: &str, user_email: &str) -> Result<LikeResponse> {
        let body = LikeRequest { user_email };
        self.api
            .request(Method::PATCH, &format!("/tips/{}/like", id), None, Some(&body))
            .await
    }

    /// Append a comment; the server answers with the full comment list
    pub async fn comment(&self, id: &str, comment: &CommentRequest) -> Result<CommentResponse> {
        self.api
            .post(&format!("/tips/{}/comment", id))
            .json(comment)?
            .execute()
            .await
    }
}

