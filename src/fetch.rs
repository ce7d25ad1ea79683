//! HTTP client abstraction for the GardenGlow REST API

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// Sentinel filter value meaning "no constraint"
pub const ALL: &str = "all";

/// Query parameters for a request.
///
/// Values equal to [`ALL`] or empty are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter unless it is the "all" sentinel
    pub fn param<V: ToString>(mut self, key: &str, value: V) -> Self {
        let value = value.to_string();
        if !value.is_empty() && value != ALL {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    /// Append a parameter if one is set
    pub fn optional<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// The parameters that will be sent, in insertion order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Client for the backend REST API
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: Url,
    http_client: Client,
}

impl ResourceClient {
    /// Create a client rooted at `base_url`
    pub fn new(base_url: &str, http_client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be used as a base URL", base_url)));
        }
        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// The API base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL and attach the query string
    pub fn url(&self, path: &str, query: &QueryParams) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config("base URL cannot carry a path"))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    /// Start a request
    pub fn fetch(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, method, path)
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        self.fetch(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        self.fetch(Method::POST, path)
    }

    /// Create a PATCH request
    pub fn patch(&self, path: &str) -> FetchBuilder<'_> {
        self.fetch(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(&self, path: &str) -> FetchBuilder<'_> {
        self.fetch(Method::DELETE, path)
    }

    /// Send one request and decode the JSON answer.
    ///
    /// Any non-2xx status becomes [`Error::Http`]; nothing is retried.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<QueryParams>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut fetch = self.fetch(method, path);
        if let Some(query) = query {
            fetch = fetch.query(query);
        }
        if let Some(body) = body {
            fetch = fetch.json(body)?;
        }
        fetch.execute().await
    }
}

/// Helper for building and executing a single request
pub struct FetchBuilder<'a> {
    client: &'a ResourceClient,
    method: Method,
    path: String,
    headers: HeaderMap,
    query: QueryParams,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    fn new(client: &'a ResourceClient, method: Method, path: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            method,
            path: path.to_string(),
            headers,
            query: QueryParams::new(),
            body: None,
        }
    }

    /// Set the query parameters
    pub fn query(mut self, params: QueryParams) -> Self {
        self.query = params;
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.client.url(&self.path, &self.query)?;
        debug!("{} {}", self.method, url);

        let mut req = self
            .client
            .http_client
            .request(self.method.clone(), url)
            .headers(self.headers);
        if let Some(body) = self.body {
            req = req.body(body);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = server_message(&text);
            warn!(
                "{} {} failed with status {}: {}",
                self.method,
                self.path,
                status,
                message.as_deref().unwrap_or("-")
            );
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Extract the `message` (or `error`) field of a JSON error body
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
