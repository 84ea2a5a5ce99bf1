use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A forum (category) holding threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Forum {
    pub title: String,
    /// Owner nickname
    #[sqlx(rename = "owner")]
    pub user: String,
    pub slug: String,
    /// Maintained by the store
    pub posts: i64,
    /// Maintained by the store
    pub threads: i64,
}

/// Request to create a forum
#[derive(Debug, Clone, Deserialize)]
pub struct CreateForumRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub slug: String,
}

impl CreateForumRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.is_empty() {
            return Err("title is required");
        }
        if self.user.is_empty() {
            return Err("user is required");
        }
        if self.slug.is_empty() {
            return Err("slug is required");
        }
        Ok(())
    }
}
