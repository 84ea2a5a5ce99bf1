use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Forum, Thread, User};

/// A post inside a thread's reply tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    /// Parent post id, 0 for root posts
    pub parent: i64,
    pub author: String,
    pub message: String,
    /// Set the first time the message actually changes
    pub is_edited: bool,
    /// Forum slug, copied from the thread
    pub forum: String,
    pub thread: i32,
    pub created: DateTime<Utc>,
    /// Ancestor ids from the root post down to this post (inclusive)
    #[serde(skip)]
    pub path: Vec<i64>,
}

impl Post {
    /// Id of the root post of this post's subtree
    pub fn root_id(&self) -> i64 {
        self.path.first().copied().unwrap_or(self.id)
    }

    pub fn is_root(&self) -> bool {
        self.parent == 0
    }
}

/// One element of a batch post creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub parent: i64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub message: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.author.is_empty() {
            return Err("author is required");
        }
        if self.message.is_empty() {
            return Err("message is required");
        }
        Ok(())
    }
}

/// Request to edit a post message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub message: String,
}

/// A post plus whichever related entities were requested
#[derive(Debug, Clone, Serialize)]
pub struct PostInfo {
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Thread>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum: Option<Forum>,
}

/// Relations to attach to a [`PostInfo`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Related {
    pub user: bool,
    pub thread: bool,
    pub forum: bool,
}

impl Related {
    /// Parse a comma-separated list such as `user,thread`. Unknown names are ignored.
    pub fn parse(related: &str) -> Self {
        let mut result = Related::default();
        for name in related.split(',').map(str::trim) {
            match name {
                "user" => result.user = true,
                "thread" => result.thread = true,
                "forum" => result.forum = true,
                _ => {}
            }
        }
        result
    }
}
