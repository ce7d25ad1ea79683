//! Types for tips and their engagement data

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::numeric::deserialize_count;
use crate::validation::{
    validate_description, validate_image_url, validate_title, ValidationError,
};

/// Tip categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Plant Care")]
    PlantCare,
    #[serde(rename = "Composting")]
    Composting,
    #[serde(rename = "Vertical Gardening")]
    VerticalGardening,
    #[serde(rename = "Indoor Plants")]
    IndoorPlants,
    #[serde(rename = "Soil Health")]
    SoilHealth,
    #[serde(rename = "Pest Control")]
    PestControl,
    #[serde(rename = "Seasonal Tips")]
    SeasonalTips,
    #[serde(rename = "Water Management")]
    WaterManagement,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::PlantCare,
        Category::Composting,
        Category::VerticalGardening,
        Category::IndoorPlants,
        Category::SoilHealth,
        Category::PestControl,
        Category::SeasonalTips,
        Category::WaterManagement,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PlantCare => "Plant Care",
            Category::Composting => "Composting",
            Category::VerticalGardening => "Vertical Gardening",
            Category::IndoorPlants => "Indoor Plants",
            Category::SoilHealth => "Soil Health",
            Category::PestControl => "Pest Control",
            Category::SeasonalTips => "Seasonal Tips",
            Category::WaterManagement => "Water Management",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare ignoring case, spaces, dashes and underscores
fn loose_eq(a: &str, b: &str) -> bool {
    let squash = |s: &str| {
        s.chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    squash(a) == squash(b)
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| loose_eq(c.as_str(), s))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Difficulty levels, ordered from easiest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| loose_eq(d.as_str(), s))
            .ok_or_else(|| format!("unknown difficulty '{}'", s))
    }
}

/// Whether a tip is listed publicly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Hidden,
}

/// A comment on a tip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_photo: Option<String>,
    /// Comment body
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// A shared gardening tip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub topic: Option<String>,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_photo: Option<String>,
    /// Author identity
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub availability: Visibility,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: BTreeSet<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Tip {
    pub fn is_liked_by(&self, email: &str) -> bool {
        self.liked_by.contains(email)
    }

    pub fn is_owned_by(&self, email: &str) -> bool {
        !self.email.is_empty() && self.email.eq_ignore_ascii_case(email)
    }
}

/// Fields a user fills in when sharing a tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipDraft {
    pub title: String,
    pub topic: Option<String>,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub image: String,
    pub availability: Visibility,
}

impl TipDraft {
    /// Run every form check, stopping at the first failure
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        validate_image_url(&self.image)?;
        Ok(())
    }
}

/// Body of `POST /tips`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTip {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub description: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub image: String,
    pub availability: Visibility,
    pub author: String,
    pub author_photo: String,
    pub email: String,
    pub date: DateTime<Utc>,
    pub likes: u64,
    pub comments: Vec<Comment>,
}

impl NewTip {
    /// Creation body for a draft written by the given author
    pub fn from_draft(draft: TipDraft, author: &str, author_photo: &str, email: &str) -> Self {
        Self {
            title: draft.title.trim().to_string(),
            topic: draft.topic,
            description: draft.description.trim().to_string(),
            category: draft.category,
            difficulty: draft.difficulty,
            image: draft.image.trim().to_string(),
            availability: draft.availability,
            author: author.to_string(),
            author_photo: author_photo.to_string(),
            email: email.to_string(),
            date: Utc::now(),
            likes: 0,
            comments: Vec::new(),
        }
    }
}

/// Body of `PATCH /tips/:id`; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TipUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Visibility>,
}

impl TipUpdate {
    /// Validate the fields that are being changed
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(image) = &self.image {
            validate_image_url(image)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &TipUpdate::default()
    }
}

/// Body of `PATCH /tips/:id/like`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest<'a> {
    pub user_email: &'a str,
}

/// Authoritative like state returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: BTreeSet<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /tips/:id/comment`
pub type CommentRequest = Comment;

/// Comment list returned after posting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentResponse {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Response of `GET /tips/count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TipCount {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub count: u64,
}

/// Response of `DELETE /tips/:id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmation {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub deleted_count: u64,
}
