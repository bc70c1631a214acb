// GitHub API wire types.
// Defines structs for deserializing user, follower, and search responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scalar attributes of an account as last observed from the remote API.
///
/// Everything besides `login` is optional: the API nulls or omits whatever the
/// account has not filled in. `login` is case-sensitive as returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
    #[serde(default)]
    pub public_repos: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Minimal profile holding only a login, for records created by a relation
    /// fetch that was never preceded by a profile fetch.
    pub fn placeholder(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Self::default()
        }
    }
}

/// Lightweight account reference used in follower/following lists and search
/// results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub login: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One page of free-text search results, ranked by the remote system.
///
/// Transient: search pages are returned to the caller and never merged into
/// the entity store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<UserSummary>,
}

impl SearchPage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
