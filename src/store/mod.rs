//! Storage seam
//!
//! The engine talks to storage only through these traits. `Database` in
//! [`crate::db`] implements them over Postgres; [`MemoryStore`] keeps
//! everything in process for tests and local runs. Both report constraint
//! failures as a [`Violation`] so callers never inspect backend error text.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::models::{
    CreateForumRequest, CreatePostRequest, CreateThreadRequest, Forum, Post, Status, Thread,
    ThreadUpdate, User, UserProfile, Vote,
};
use crate::paging::{PostPage, ThreadPage, UserPage};

/// SQLSTATE raised by the post path trigger for a parent outside the thread
pub const INVALID_PARENT_CODE: &str = "77777";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// A write rejected by a storage constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// A referenced user, forum or thread does not exist
    MissingReference,
    /// A unique key (nickname, email, slug, vote) is already taken
    UniqueConflict,
    /// A post parent is missing or belongs to another thread
    InvalidParent,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Constraint violation: {0:?}")]
    Violation(Violation),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn violation(&self) -> Option<Violation> {
        match self {
            StoreError::Violation(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Violation> for StoreError {
    fn from(violation: Violation) -> Self {
        StoreError::Violation(violation)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let violation = match &err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => Some(Violation::MissingReference),
                Some(UNIQUE_VIOLATION) => Some(Violation::UniqueConflict),
                Some(INVALID_PARENT_CODE) => Some(Violation::InvalidParent),
                _ => None,
            },
            _ => None,
        };
        match violation {
            Some(v) => StoreError::Violation(v),
            None => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> StoreResult<User>;

    async fn user_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>>;

    /// Users holding either key, ordered by nickname
    async fn users_by_nickname_or_email(&self, nickname: &str, email: &str)
        -> StoreResult<Vec<User>>;

    /// Apply the non-empty fields of `profile`; `None` if the user is unknown
    async fn update_user(&self, nickname: &str, profile: &UserProfile)
        -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn insert_forum(&self, forum: &CreateForumRequest) -> StoreResult<Forum>;

    async fn forum_by_slug(&self, slug: &str) -> StoreResult<Option<Forum>>;

    /// Distinct authors of threads and posts in the forum
    async fn forum_users(&self, slug: &str, page: &UserPage) -> StoreResult<Vec<User>>;

    async fn forum_threads(&self, slug: &str, page: &ThreadPage) -> StoreResult<Vec<Thread>>;
}

#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn insert_thread(&self, forum: &Forum, thread: &CreateThreadRequest)
        -> StoreResult<Thread>;

    async fn thread_by_id(&self, id: i32) -> StoreResult<Option<Thread>>;

    async fn thread_by_slug(&self, slug: &str) -> StoreResult<Option<Thread>>;

    /// Apply the non-empty fields of `update`; `None` if the thread is unknown
    async fn update_thread(&self, id: i32, update: &ThreadUpdate) -> StoreResult<Option<Thread>>;

    /// Record a first vote; `UniqueConflict` if the user already voted
    async fn insert_vote(&self, thread_id: i32, vote: &Vote) -> StoreResult<()>;

    /// Replace an existing vote; `false` if there was none
    async fn update_vote(&self, thread_id: i32, vote: &Vote) -> StoreResult<bool>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a batch atomically with one shared creation time
    async fn insert_posts(&self, thread: &Thread, posts: &[CreatePostRequest])
        -> StoreResult<Vec<Post>>;

    async fn post_by_id(&self, id: i64) -> StoreResult<Option<Post>>;

    async fn thread_posts(&self, thread_id: i32, page: &PostPage) -> StoreResult<Vec<Post>>;

    /// Replace a message, marking the post edited only if the text changed
    async fn update_post_message(&self, id: i64, message: &str) -> StoreResult<Option<Post>>;
}

#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn status(&self) -> StoreResult<Status>;

    /// Remove every entity
    async fn clear(&self) -> StoreResult<()>;
}

/// Everything the engine needs from a backend
pub trait Store: UserStore + ForumStore + ThreadStore + PostStore + ServiceStore {}

impl<T> Store for T where T: UserStore + ForumStore + ThreadStore + PostStore + ServiceStore {}
