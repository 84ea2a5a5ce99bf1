use crate::error::{AppError, Result};
use crate::models::{CreateForumRequest, CreateThreadRequest, Forum, Thread, User};
use crate::paging::{ThreadPage, UserPage};
use crate::store::{ForumStore, ThreadStore, Violation};

use super::{Creation, Engine};

impl Engine {
    /// Create a forum. Repeating a create returns the stored forum as a conflict.
    pub async fn create_forum(&self, forum: CreateForumRequest) -> Result<Creation<Forum>> {
        match self.store.insert_forum(&forum).await {
            Ok(created) => {
                tracing::debug!("Created forum {}", created.slug);
                Ok(Creation::Created(created))
            }
            Err(e) => match e.violation() {
                Some(Violation::UniqueConflict) => {
                    let existing = self.forum(&forum.slug).await?;
                    tracing::debug!("Forum {} already exists", existing.slug);
                    Ok(Creation::Conflict(existing))
                }
                Some(Violation::MissingReference) => Err(AppError::ReferenceNotFound(format!(
                    "Can't find user with nickname: {}",
                    forum.user
                ))),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn forum(&self, slug: &str) -> Result<Forum> {
        self.store
            .forum_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Can't find forum with slug: {}", slug)))
    }

    /// Create a thread in a forum. A taken slug returns the stored thread as a conflict.
    pub async fn create_thread(
        &self,
        forum_slug: &str,
        thread: CreateThreadRequest,
    ) -> Result<Creation<Thread>> {
        let forum = self.forum(forum_slug).await?;

        match self.store.insert_thread(&forum, &thread).await {
            Ok(created) => {
                tracing::debug!("Created thread {} in forum {}", created.id, forum.slug);
                Ok(Creation::Created(created))
            }
            Err(e) => match (e.violation(), thread.slug()) {
                (Some(Violation::UniqueConflict), Some(slug)) => {
                    match self.store.thread_by_slug(slug).await? {
                        Some(existing) => Ok(Creation::Conflict(existing)),
                        None => Err(e.into()),
                    }
                }
                (Some(Violation::MissingReference), _) => Err(AppError::ReferenceNotFound(
                    format!("Can't find thread author by nickname: {}", thread.author),
                )),
                _ => Err(e.into()),
            },
        }
    }

    /// An empty page is only valid for a forum that exists
    pub async fn forum_users(&self, slug: &str, page: &UserPage) -> Result<Vec<User>> {
        let users = self.store.forum_users(slug, page).await?;
        if users.is_empty() {
            self.forum(slug).await?;
        }
        Ok(users)
    }

    pub async fn forum_threads(&self, slug: &str, page: &ThreadPage) -> Result<Vec<Thread>> {
        let threads = self.store.forum_threads(slug, page).await?;
        if threads.is_empty() {
            self.forum(slug).await?;
        }
        Ok(threads)
    }
}
