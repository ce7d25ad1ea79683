//! Filter criteria for browsing tips

use std::fmt;
use std::str::FromStr;

use crate::fetch::{QueryParams, ALL};
use crate::tips::types::{Category, Difficulty};

/// Ordering requested from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Descending creation time
    #[default]
    Newest,
    /// Descending like count
    MostLiked,
}

impl SortMode {
    /// Value of the `sortBy` parameter
    pub fn sort_by(&self) -> &'static str {
        match self {
            SortMode::Newest => "date",
            SortMode::MostLiked => "likes",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::MostLiked => "mostLiked",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "newest" => Ok(SortMode::Newest),
            "mostliked" | "likes" => Ok(SortMode::MostLiked),
            _ => Err(format!("unknown sort mode '{}'", s)),
        }
    }
}

/// User-selected constraints on the tip list.
///
/// `None` stands for "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub sort: SortMode,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Query string for `GET /tips`. Difficulty is filtered server-side only.
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .param("sortBy", self.sort.sort_by())
            .param("order", "desc")
            .param("category", self.category.map_or(ALL, |c| c.as_str()))
            .param("difficulty", self.difficulty.map_or(ALL, |d| d.as_str()))
    }
}
