//! List query parameters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::Category;

/// Date ordering for the expense list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date_desc",
            SortOrder::DateAsc => "date_asc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "date_desc" | "newest" => Ok(SortOrder::DateDesc),
            "date_asc" | "oldest" => Ok(SortOrder::DateAsc),
            other => Err(Error::validation(format!(
                "Unknown sort order '{}'. Use date_desc or date_asc",
                other
            ))),
        }
    }
}

/// Filter and sort for `GET /expenses`.
///
/// `None` fields are omitted from the query string, meaning "no filter"
/// and "server default order" respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpenseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl Default for ExpenseQuery {
    /// All categories, newest first
    fn default() -> Self {
        Self {
            category: None,
            sort: Some(SortOrder::DateDesc),
        }
    }
}

impl ExpenseQuery {
    pub fn new(category: Option<Category>, sort: Option<SortOrder>) -> Self {
        Self { category, sort }
    }

    /// Query pairs in wire order
    pub fn to_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str()));
        }
        pairs
    }
}
