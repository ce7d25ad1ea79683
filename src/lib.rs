//! GardenGlow Rust Client Library
//!
//! A client for the GardenGlow gardening tips community: browsing and
//! filtering tips, liking and commenting with optimistic updates, gardener
//! profiles, a personal dashboard, and accounts backed by an identity
//! provider.

pub mod account;
pub mod browse;
pub mod config;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod gardeners;
pub mod guard;
pub mod mutation;
pub mod notice;
pub mod numeric;
pub mod session;
pub mod store;
pub mod tips;
pub mod users;
pub mod validation;

use std::sync::Arc;

use gardenglow_auth::{FirebaseAuth, IdentityProvider};
use log::debug;
use reqwest::Client;

use crate::account::Accounts;
use crate::browse::BrowseTips;
use crate::config::ClientOptions;
use crate::dashboard::MyTips;
use crate::detail::TipDetail;
use crate::error::Result;
use crate::fetch::ResourceClient;
use crate::gardeners::GardenersClient;
use crate::guard::{RedirectSlot, RouteGuard};
use crate::mutation::{MutationEngine, PendingMutations};
use crate::notice::Notifier;
use crate::session::SessionStore;
use crate::store::TipStore;
use crate::tips::TipsClient;
use crate::users::UsersClient;

/// The main entry point for the GardenGlow client.
///
/// Owns the shared HTTP client and the session store, and hands out the
/// components built on them. Every component created from one client sees
/// the same session.
#[derive(Debug, Clone)]
pub struct GardenGlow {
    options: ClientOptions,
    http_client: Client,
    api: ResourceClient,
    session: SessionStore,
    pending: PendingMutations,
    notifier: Notifier,
}

impl GardenGlow {
    /// Create a client using the Identity Toolkit for accounts
    ///
    /// # Example
    ///
    /// ```
    /// use gardenglow::{GardenGlow, config::{Backend, ClientOptions}};
    ///
    /// let options = ClientOptions::default().with_backend(Backend::Local);
    /// let client = GardenGlow::new(options).unwrap();
    /// ```
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http_client = build_http_client(&options)?;
        let provider = FirebaseAuth::new(options.auth_options(), http_client.clone());
        Self::assemble(options, http_client, Arc::new(provider))
    }

    /// Create a client with a custom identity provider
    pub fn with_provider(options: ClientOptions, provider: Arc<dyn IdentityProvider>) -> Result<Self> {
        let http_client = build_http_client(&options)?;
        Self::assemble(options, http_client, provider)
    }

    fn assemble(
        options: ClientOptions,
        http_client: Client,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        options.validate()?;
        let api = ResourceClient::new(&options.api_url, http_client.clone())?;
        debug!("GardenGlow client for {}", options.api_url);
        Ok(Self {
            options,
            http_client,
            api,
            session: SessionStore::new(provider),
            pending: PendingMutations::new(),
            notifier: Notifier::silent(),
        })
    }

    /// Deliver notices to `notifier` from now on
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The session shared by every component of this client
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn tips(&self) -> TipsClient {
        TipsClient::new(self.api.clone())
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.api.clone())
    }

    pub fn gardeners(&self) -> GardenersClient {
        GardenersClient::new(self.api.clone())
    }

    /// A browse list with its own collection
    pub fn browse(&self) -> BrowseTips {
        BrowseTips::new(self.tips(), TipStore::new(), self.notifier.clone())
    }

    /// A single tip view with its own collection
    pub fn detail(&self) -> TipDetail {
        TipDetail::new(self.tips(), TipStore::new(), self.notifier.clone())
    }

    /// Like and comment on the tips held in `store`.
    ///
    /// All engines of this client share one pending set, so a tip has at
    /// most one like and one comment in flight.
    pub fn engine(&self, store: &TipStore) -> MutationEngine {
        MutationEngine::new(
            self.tips(),
            store.clone(),
            self.session.clone(),
            self.pending.clone(),
            self.notifier.clone(),
        )
    }

    pub fn guard(&self, slot: Arc<dyn RedirectSlot>) -> RouteGuard {
        RouteGuard::new(self.session.clone(), slot)
    }

    /// The signed-in user's tips and dashboard
    pub fn my_tips(&self) -> MyTips {
        MyTips::new(
            self.tips(),
            self.users(),
            self.session.clone(),
            TipStore::new(),
            self.notifier.clone(),
        )
    }

    /// Account flows resuming through `guard`
    pub fn accounts(&self, guard: RouteGuard) -> Accounts {
        Accounts::new(
            self.session.clone(),
            self.users(),
            guard,
            self.notifier.clone(),
        )
    }

    /// Load trending tips into `store`; like them with [`GardenGlow::engine`]
    pub async fn trending(&self, store: &TipStore) -> Result<usize> {
        dashboard::load_trending(&self.tips(), store, &self.notifier).await
    }
}

fn build_http_client(options: &ClientOptions) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = options.request_timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{Backend, ClientOptions};
    pub use crate::error::{Error, Result};
    pub use crate::mutation::{CommentOutcome, LikeOutcome};
    pub use crate::notice::{Notice, NoticeKind, Notifier};
    pub use crate::session::{SessionIdentity, SessionState};
    pub use crate::store::TipStore;
    pub use crate::tips::{Category, Difficulty, FilterCriteria, SortMode, Tip};
    pub use crate::GardenGlow;
}
