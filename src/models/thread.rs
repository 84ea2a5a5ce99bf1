use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A discussion thread inside a forum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Thread {
    pub id: i32,
    pub title: String,
    pub author: String,
    /// Forum slug, copied from the forum at creation
    pub forum: String,
    pub message: String,
    /// Sum of all voices, maintained by the store
    pub votes: i32,
    /// Threads created without a slug are addressed by id only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub created: DateTime<Utc>,
}

/// Request to create a thread. The forum comes from the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl CreateThreadRequest {
    /// The requested slug, with an empty string treated as no slug
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().filter(|s| !s.is_empty())
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.is_empty() {
            return Err("title is required");
        }
        if self.author.is_empty() {
            return Err("author is required");
        }
        if self.message.is_empty() {
            return Err("message is required");
        }
        Ok(())
    }
}

/// Partial thread update: empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadUpdate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub forum: String,
    #[serde(default)]
    pub message: String,
}

impl ThreadUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.author.is_empty()
            && self.forum.is_empty()
            && self.message.is_empty()
    }
}

/// A thread reference taken from a route segment: numeric id or slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadRef {
    Id(i32),
    Slug(String),
}

impl ThreadRef {
    /// Integer-looking input is an id; anything else is a slug
    pub fn parse(slug_or_id: &str) -> Self {
        match slug_or_id.parse::<i32>() {
            Ok(id) => ThreadRef::Id(id),
            Err(_) => ThreadRef::Slug(slug_or_id.to_string()),
        }
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadRef::Id(id) => write!(f, "id {}", id),
            ThreadRef::Slug(slug) => write!(f, "slug '{}'", slug),
        }
    }
}

/// A user's voice on a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub nickname: String,
    /// +1 or -1
    pub voice: i32,
}

impl Vote {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.nickname.is_empty() {
            return Err("nickname is required");
        }
        if self.voice != 1 && self.voice != -1 {
            return Err("voice must be 1 or -1");
        }
        Ok(())
    }
}
