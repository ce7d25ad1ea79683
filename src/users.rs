//! User records kept by the backend

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fetch::ResourceClient;
use crate::numeric::deserialize_count;
use crate::session::SessionIdentity;

/// Activity recorded when a user shares a tip
pub const TIP_SHARED_ACTIVITY: &str = "Shared a gardening tip";

/// Activity recorded when a record is created
pub const ACCOUNT_CREATED_ACTIVITY: &str = "Account created";

/// A user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub tip_count: u64,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub last_activity_time: Option<DateTime<Utc>>,
}

/// Body of `POST /users`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub creation_time: DateTime<Utc>,
    pub last_sign_in_time: DateTime<Utc>,
    pub tip_count: u64,
    pub last_activity: String,
    pub last_activity_time: DateTime<Utc>,
}

impl NewUser {
    /// A fresh record for the signed-in identity
    pub fn for_identity(identity: &SessionIdentity) -> Self {
        let now = Utc::now();
        Self {
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            photo_url: identity.photo_url.clone(),
            creation_time: now,
            last_sign_in_time: now,
            tip_count: 0,
            last_activity: ACCOUNT_CREATED_ACTIVITY.to_string(),
            last_activity_time: now,
        }
    }
}

/// Body of `PATCH /users/:email`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_time: Option<DateTime<Utc>>,
}

impl UserActivity {
    /// Record an activity happening now
    pub fn now(activity: &str) -> Self {
        let now = Utc::now();
        Self {
            last_sign_in_time: Some(now),
            tip_count: None,
            last_activity: Some(activity.to_string()),
            last_activity_time: Some(now),
        }
    }

    pub fn with_tip_count(mut self, count: u64) -> Self {
        self.tip_count = Some(count);
        self
    }
}

/// Client for `/users`
#[derive(Debug, Clone)]
pub struct UsersClient {
    api: ResourceClient,
}

impl UsersClient {
    pub fn new(api: ResourceClient) -> Self {
        Self { api }
    }

    /// Fetch a user record; `None` if there is none
    pub async fn get(&self, email: &str) -> Result<Option<UserProfile>> {
        match self.api.get(&format!("/users/{}", email)).execute().await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, user: &NewUser) -> Result<UserProfile> {
        let profile: UserProfile = self.api.post("/users").json(user)?.execute().await?;
        info!("Created user record for {}", profile.email);
        Ok(profile)
    }

    pub async fn update(&self, email: &str, activity: &UserActivity) -> Result<UserProfile> {
        self.api
            .patch(&format!("/users/{}", email))
            .json(activity)?
            .execute()
            .await
    }

    /// Fetch the identity's record, creating it when missing
    pub async fn get_or_create(&self, identity: &SessionIdentity) -> Result<UserProfile> {
        match self.get(&identity.email).await? {
            Some(profile) => Ok(profile),
            None => self.create(&NewUser::for_identity(identity)).await,
        }
    }

    /// Bump the identity's tip count after sharing a tip
    pub async fn record_tip_shared(&self, identity: &SessionIdentity) -> Result<UserProfile> {
        let profile = self.get_or_create(identity).await?;
        let activity = UserActivity::now(TIP_SHARED_ACTIVITY).with_tip_count(profile.tip_count + 1);
        self.update(&identity.email, &activity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_accepts_boxed_tip_count() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Rose",
            "email": "rose@example.com",
            "photoURL": "https://img.example.com/rose.png",
            "tipCount": {"$numberInt": "3"},
            "lastActivity": "Shared a gardening tip"
        }))
        .unwrap();
        assert_eq!(profile.tip_count, 3);
        assert_eq!(profile.photo_url.as_deref(), Some("https://img.example.com/rose.png"));
    }

    #[test]
    fn activity_skips_unset_fields() {
        let activity = UserActivity {
            last_activity: Some(TIP_SHARED_ACTIVITY.to_string()),
            ..Default::default()
        }
        .with_tip_count(4);
        assert_eq!(
            serde_json::to_value(&activity).unwrap(),
            json!({"tipCount": 4, "lastActivity": "Shared a gardening tip"})
        );
    }
}
