use serde::{Deserialize, Serialize};

/// Ordering applied to product and article listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Recent,
    /// Highest favorite count first, newest first among equals
    Favorite,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SortOrder::Recent => write!(f, "recent"),
            SortOrder::Favorite => write!(f, "favorite"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            // "latest" is what older clients send
            "recent" | "latest" => Ok(SortOrder::Recent),
            "favorite" => Ok(SortOrder::Favorite),
            _ => Err(format!(
                "Unknown sort order '{}': expected 'recent' or 'favorite'",
                s
            )),
        }
    }
}

/// Offset-paginated, optionally keyword-filtered listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub sort: SortOrder,
    pub skip: usize,
    pub limit: usize,
    pub keyword: Option<String>,
}

impl ListQuery {
    pub fn new(sort: SortOrder, skip: usize, limit: usize) -> Self {
        Self {
            sort,
            skip,
            limit,
            keyword: None,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// True when the keyword occurs in any of the given fields, ignoring case.
    /// A query without keyword matches everything.
    pub fn matches(&self, fields: &[&str]) -> bool {
        let Some(keyword) = &self.keyword else {
            return true;
        };
        let needle = keyword.to_lowercase();
        fields
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One page of a listing plus the number of matches ignoring skip/limit
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub search_count: usize,
}
