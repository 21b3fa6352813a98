//! Content pool entries: the external corpus agents may consult.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RequestError;

/// Closed set of content categories.
///
/// Declaration order is also the tie-break order for rare-category sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Prose
    Text,
    Code,
    /// Structured data (CSV, tables, ...)
    Data,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 3] = [Self::Text, Self::Code, Self::Data];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Data => "data",
        }
    }
}

impl FromStr for ContentCategory {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "code" => Ok(Self::Code),
            "data" => Ok(Self::Data),
            other => Err(RequestError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of content in the pool. Immutable after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Caller-assigned identity
    pub id: String,

    #[serde(rename = "content_type")]
    pub category: ContentCategory,

    pub title: String,

    #[serde(rename = "content")]
    pub body: String,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    pub added_at: DateTime<Utc>,
}

impl ContentEntry {
    pub fn new(
        id: impl Into<String>,
        category: ContentCategory,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            title: title.into(),
            body: body.into(),
            metadata: serde_json::Map::new(),
            added_at: Utc::now(),
        }
    }

    /// Case-insensitive substring match against title or body.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.body.to_lowercase().contains(needle_lower)
            || self.title.to_lowercase().contains(needle_lower)
    }
}
