use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fetch::{QueryParams, ALL};
use crate::numeric::deserialize_int;

/// Experience bucket used for filtering and badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceTier {
    Beginner,
    Intermediate,
    Experienced,
    Expert,
}

impl ExperienceTier {
    pub const ALL: [ExperienceTier; 4] = [
        ExperienceTier::Beginner,
        ExperienceTier::Intermediate,
        ExperienceTier::Experienced,
        ExperienceTier::Expert,
    ];

    /// Bucket a number of years
    pub fn from_years(years: i64) -> Self {
        match years {
            y if y >= 10 => ExperienceTier::Expert,
            y if y >= 5 => ExperienceTier::Experienced,
            y if y >= 3 => ExperienceTier::Intermediate,
            _ => ExperienceTier::Beginner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceTier::Beginner => "beginner",
            ExperienceTier::Intermediate => "intermediate",
            ExperienceTier::Experienced => "experienced",
            ExperienceTier::Expert => "expert",
        }
    }
}

/// Gardener activity status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GardenerStatus {
    Active,
    Inactive,
}

impl GardenerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GardenerStatus::Active => "active",
            GardenerStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

macro_rules! lowercase_enum_traits {
    ($ty:ident, $what:literal, [$($variant:ident),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($ty::$variant),+]
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| format!(concat!("unknown ", $what, " '{}'"), s))
            }
        }
    };
}

lowercase_enum_traits!(ExperienceTier, "experience level", [Beginner, Intermediate, Experienced, Expert]);
lowercase_enum_traits!(GardenerStatus, "status", [Active, Inactive]);
lowercase_enum_traits!(Gender, "gender", [Male, Female, Other]);

/// A community gardener profile.
///
/// Numeric fields arrive as numbers, numeric strings or boxed wrappers and
/// are normalized on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gardener {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_int")]
    pub age: i64,
    #[serde(default)]
    pub gender: String,
    /// Years of experience
    #[serde(default, deserialize_with = "deserialize_int")]
    pub experience: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "deserialize_int")]
    pub total_tips: i64,
    #[serde(default, deserialize_with = "deserialize_int")]
    pub likes_received: i64,
}

impl Gardener {
    pub fn experience_tier(&self) -> ExperienceTier {
        ExperienceTier::from_years(self.experience)
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case(GardenerStatus::Active.as_str())
    }
}

/// Optional constraints for `GET /gardeners`; `None` means all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GardenerFilter {
    pub experience: Option<ExperienceTier>,
    pub status: Option<GardenerStatus>,
    pub gender: Option<Gender>,
}

impl GardenerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_experience(mut self, experience: Option<ExperienceTier>) -> Self {
        self.experience = experience;
        self
    }

    pub fn with_status(mut self, status: Option<GardenerStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .param("experience", self.experience.map_or(ALL, |e| e.as_str()))
            .param("status", self.status.map_or(ALL, |s| s.as_str()))
            .param("gender", self.gender.map_or(ALL, |g| g.as_str()))
    }
}
