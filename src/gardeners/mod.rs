//! Gardener profiles

mod types;

use log::debug;
use reqwest::Method;

use crate::error::Result;
use crate::fetch::ResourceClient;

pub use types::*;

/// Client for `/gardeners`
#[derive(Debug, Clone)]
pub struct GardenersClient {
    api: ResourceClient,
}

impl GardenersClient {
    pub fn new(api: ResourceClient) -> Self {
        Self { api }
    }

    /// Gardeners matching the filter
    pub async fn list(&self, filter: &GardenerFilter) -> Result<Vec<Gardener>> {
        debug!("Fetching gardeners for {:?}", filter);
        self.api
            .request::<_, ()>(Method::GET, "/gardeners", Some(filter.to_query()), None)
            .await
    }

    /// Featured active gardeners
    pub async fn active(&self) -> Result<Vec<Gardener>> {
        self.api.get("/gardeners/active").execute().await
    }
}
