//! Read-requests: what an agent asks to see before it thinks.
//!
//! Each request names its target collection and carries explicit, named
//! filter fields. Unknown filter names fail at construction.

use serde::{Deserialize, Serialize};

use crate::content::ContentCategory;
use crate::error::RequestError;
use crate::query::ArtifactQuery;

fn default_search_limit() -> usize {
    5
}

/// A query against the content pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum PoolQuery {
    /// Uniform random sample without replacement
    Sample {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<ContentCategory>,
        n: usize,
    },
    /// Case-insensitive substring search over title and body
    Search {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<ContentCategory>,
        #[serde(default = "default_search_limit")]
        limit: usize,
    },
    /// One entry from the least-populated non-empty category
    RareCategory,
}

/// A declarative read-request, tagged by target collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case", deny_unknown_fields)]
pub enum ReadRequest {
    Log {
        #[serde(default)]
        label: String,
        #[serde(default)]
        filter: ArtifactQuery,
    },
    Pool {
        #[serde(default)]
        label: String,
        filter: PoolQuery,
    },
}

impl ReadRequest {
    pub fn log(label: impl Into<String>, filter: ArtifactQuery) -> Self {
        Self::Log {
            label: label.into(),
            filter,
        }
    }

    pub fn pool(label: impl Into<String>, filter: PoolQuery) -> Self {
        Self::Pool {
            label: label.into(),
            filter,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Log { label, .. } | Self::Pool { label, .. } => label,
        }
    }

    /// Build a request from loosely-typed JSON, rejecting unknown filter names.
    pub fn from_json(value: serde_json::Value) -> Result<Self, RequestError> {
        let request: Self =
            serde_json::from_value(value).map_err(|e| RequestError::Invalid(e.to_string()))?;
        if let Self::Log { filter, .. } = &request {
            filter.validate()?;
        }
        Ok(request)
    }
}
