//! Registration, login and logout

use gardenglow_auth::OAuthProvider;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::guard::RouteGuard;
use crate::notice::Notifier;
use crate::session::{SessionIdentity, SessionStore, DEFAULT_PHOTO_URL};
use crate::users::{NewUser, UsersClient};
use crate::validation::validate_password;

/// Details entered on the registration form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo_url: Option<String>,
}

/// Account flows tying the session to the backend user records
#[derive(Debug, Clone)]
pub struct Accounts {
    session: SessionStore,
    users: UsersClient,
    guard: RouteGuard,
    notifier: Notifier,
}

impl Accounts {
    pub fn new(session: SessionStore, users: UsersClient, guard: RouteGuard, notifier: Notifier) -> Self {
        Self {
            session,
            users,
            guard,
            notifier,
        }
    }

    /// Create an account, set its profile and store the user record
    pub async fn register(&self, form: &Registration) -> Result<SessionIdentity> {
        if let Err(e) = validate_password(&form.password) {
            self.notifier.warning(e.title(), "Please meet all password requirements");
            return Err(e.into());
        }

        let result: Result<SessionIdentity> = async {
            self.session.sign_up(&form.email, &form.password).await?;
            let photo_url = form.photo_url.as_deref().unwrap_or(DEFAULT_PHOTO_URL);
            let identity = self
                .session
                .update_profile(Some(&form.name), Some(photo_url))
                .await?;
            self.users.create(&NewUser::for_identity(&identity)).await?;
            Ok(identity)
        }
        .await;

        match result {
            Ok(identity) => {
                info!("Registered {}", identity.email);
                self.notifier.success(
                    "Welcome to GardenGlow! 🌱",
                    "Your account has been created successfully",
                );
                Ok(identity)
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                self.notifier.error("Registration Failed", &e.to_string());
                Err(e)
            }
        }
    }

    /// Sign in and return the path to continue at
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        match self.session.sign_in(email, password).await {
            Ok(identity) => {
                info!("Logged in as {}", identity.email);
                self.notifier.success("Welcome back! 🌱", "Successfully logged in");
                Ok(self.guard.resume_path())
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                let text = match &e {
                    Error::Auth(auth) if auth.is_invalid_credentials() => {
                        "Invalid email or password".to_string()
                    }
                    _ => e.to_string(),
                };
                self.notifier.error("Login Failed", &text);
                Err(e)
            }
        }
    }

    /// Sign in with a federated provider token and return the path to continue at.
    ///
    /// The backend user record is created on first sign-in.
    pub async fn login_with_provider(&self, provider: OAuthProvider, id_token: &str) -> Result<String> {
        let result: Result<SessionIdentity> = async {
            let identity = self.session.sign_in_with_idp(provider, id_token).await?;
            self.users.get_or_create(&identity).await?;
            Ok(identity)
        }
        .await;

        match result {
            Ok(identity) => {
                info!("Logged in as {} via {:?}", identity.email, provider);
                self.notifier.success(
                    "Welcome to GardenGlow! 🌱",
                    &format!("Successfully signed in with {}", provider.display_name()),
                );
                Ok(self.guard.resume_path())
            }
            Err(e) => {
                warn!("Federated login failed: {}", e);
                self.notifier.error("Login Failed", &e.to_string());
                Err(e)
            }
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.sign_out().await?;
        self.notifier.info("Logged out", "See you in the garden soon");
        Ok(())
    }
}
