use crate::error::{AppError, Result};
use crate::models::{CreatePostRequest, Post, PostInfo, Related, ThreadRef};
use crate::paging::PostPage;
use crate::store::{ForumStore, PostStore, ThreadStore, UserStore, Violation};

use super::Engine;

impl Engine {
    /// Create a batch of posts in one thread. All or none are stored.
    pub async fn create_posts(
        &self,
        thread: &ThreadRef,
        posts: Vec<CreatePostRequest>,
    ) -> Result<Vec<Post>> {
        let target = self.resolve_thread(thread).await?;
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        match self.store.insert_posts(&target, &posts).await {
            Ok(created) => {
                tracing::debug!("Created {} posts in thread {}", created.len(), target.id);
                Ok(created)
            }
            Err(e) => match e.violation() {
                Some(Violation::MissingReference) => Err(AppError::ReferenceNotFound(
                    "Can't find post author by nickname".to_string(),
                )),
                Some(Violation::InvalidParent) => {
                    tracing::warn!(
                        "Rejected batch of {} posts for thread {}: parent outside thread",
                        posts.len(),
                        target.id
                    );
                    Err(AppError::BadParent(
                        "Parent post was created in another thread".to_string(),
                    ))
                }
                _ => Err(e.into()),
            },
        }
    }

    pub async fn thread_posts(&self, thread: &ThreadRef, page: &PostPage) -> Result<Vec<Post>> {
        let target = self.resolve_thread(thread).await?;
        Ok(self.store.thread_posts(target.id, page).await?)
    }

    pub async fn post(&self, id: i64) -> Result<Post> {
        self.store
            .post_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Can't find post with id: {}", id)))
    }

    /// A post with the related entities the caller asked for
    pub async fn post_info(&self, id: i64, related: Related) -> Result<PostInfo> {
        let post = self.post(id).await?;

        let author = if related.user {
            self.store.user_by_nickname(&post.author).await?
        } else {
            None
        };
        let thread = if related.thread {
            self.store.thread_by_id(post.thread).await?
        } else {
            None
        };
        let forum = if related.forum {
            self.store.forum_by_slug(&post.forum).await?
        } else {
            None
        };

        Ok(PostInfo {
            post,
            author,
            thread,
            forum,
        })
    }

    /// Replace a post message. An empty message leaves the post untouched.
    pub async fn update_post(&self, id: i64, message: &str) -> Result<Post> {
        if message.is_empty() {
            return self.post(id).await;
        }
        self.store
            .update_post_message(id, message)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Can't find post with id: {}", id)))
    }
}
