use async_trait::async_trait;

use crate::models::{CreateThreadRequest, Forum, Thread, ThreadUpdate, Vote};
use crate::store::{StoreResult, ThreadStore};

#[async_trait]
impl ThreadStore for super::Database {
    async fn insert_thread(
        &self,
        forum: &Forum,
        thread: &CreateThreadRequest,
    ) -> StoreResult<Thread> {
        let thread = sqlx::query_as::<_, Thread>(
            r#"
            INSERT INTO threads (title, author, forum, message, slug, created)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
            RETURNING id, title, author, forum, message, votes, slug, created
            "#,
        )
        .bind(&thread.title)
        .bind(&thread.author)
        .bind(&forum.slug)
        .bind(&thread.message)
        .bind(thread.slug())
        .bind(thread.created)
        .fetch_one(&self.pool)
        .await?;

        Ok(thread)
    }

    async fn thread_by_id(&self, id: i32) -> StoreResult<Option<Thread>> {
        let thread = sqlx::query_as::<_, Thread>(
            r#"
            SELECT id, title, author, forum, message, votes, slug, created
            FROM threads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(thread)
    }

    async fn thread_by_slug(&self, slug: &str) -> StoreResult<Option<Thread>> {
        let thread = sqlx::query_as::<_, Thread>(
            r#"
            SELECT id, title, author, forum, message, votes, slug, created
            FROM threads
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(thread)
    }

    async fn update_thread(&self, id: i32, update: &ThreadUpdate) -> StoreResult<Option<Thread>> {
        let thread = sqlx::query_as::<_, Thread>(
            r#"
            UPDATE threads SET
                title = COALESCE(NULLIF($2, ''), title),
                author = COALESCE(NULLIF($3, ''), author),
                forum = COALESCE(NULLIF($4, ''), forum),
                message = COALESCE(NULLIF($5, ''), message)
            WHERE id = $1
            RETURNING id, title, author, forum, message, votes, slug, created
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.forum)
        .bind(&update.message)
        .fetch_optional(&self.pool)
        .await?;

        Ok(thread)
    }

    async fn insert_vote(&self, thread_id: i32, vote: &Vote) -> StoreResult<()> {
        sqlx::query("INSERT INTO votes (nickname, thread, voice) VALUES ($1, $2, $3)")
            .bind(&vote.nickname)
            .bind(thread_id)
            .bind(vote.voice)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_vote(&self, thread_id: i32, vote: &Vote) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE votes SET voice = $3 WHERE nickname = $1 AND thread = $2")
            .bind(&vote.nickname)
            .bind(thread_id)
            .bind(vote.voice)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
