use async_trait::async_trait;

use crate::models::{CreateForumRequest, Forum, Thread, User};
use crate::paging::{Direction, ThreadPage, UserPage};
use crate::store::{ForumStore, StoreResult};

/// Forum members; `$3` is the exclusive nickname boundary
fn forum_users_sql(direction: Direction, bounded: bool) -> &'static str {
    match (direction, bounded) {
        (Direction::Asc, false) => {
            r#"
            SELECT u.nickname, u.fullname, u.about, u.email
            FROM forum_users fu
            JOIN users u ON u.nickname = fu.nickname
            WHERE fu.forum = $1
            ORDER BY fu.nickname COLLATE "C"
            LIMIT $2
            "#
        }
        (Direction::Asc, true) => {
            r#"
            SELECT u.nickname, u.fullname, u.about, u.email
            FROM forum_users fu
            JOIN users u ON u.nickname = fu.nickname
            WHERE fu.forum = $1 AND fu.nickname COLLATE "C" > $3
            ORDER BY fu.nickname COLLATE "C"
            LIMIT $2
            "#
        }
        (Direction::Desc, false) => {
            r#"
            SELECT u.nickname, u.fullname, u.about, u.email
            FROM forum_users fu
            JOIN users u ON u.nickname = fu.nickname
            WHERE fu.forum = $1
            ORDER BY fu.nickname COLLATE "C" DESC
            LIMIT $2
            "#
        }
        (Direction::Desc, true) => {
            r#"
            SELECT u.nickname, u.fullname, u.about, u.email
            FROM forum_users fu
            JOIN users u ON u.nickname = fu.nickname
            WHERE fu.forum = $1 AND fu.nickname COLLATE "C" < $3
            ORDER BY fu.nickname COLLATE "C" DESC
            LIMIT $2
            "#
        }
    }
}

/// Forum threads; `$3` is the inclusive creation-time boundary
fn forum_threads_sql(direction: Direction, bounded: bool) -> &'static str {
    match (direction, bounded) {
        (Direction::Asc, false) => {
            r#"
            SELECT id, title, author, forum, message, votes, slug, created
            FROM threads
            WHERE forum = $1
            ORDER BY created, id
            LIMIT $2
            "#
        }
        (Direction::Asc, true) => {
            r#"
            SELECT id, title, author, forum, message, votes, slug, created
            FROM threads
            WHERE forum = $1 AND created >= $3
            ORDER BY created, id
            LIMIT $2
            "#
        }
        (Direction::Desc, false) => {
            r#"
            SELECT id, title, author, forum, message, votes, slug, created
            FROM threads
            WHERE forum = $1
            ORDER BY created DESC, id DESC
            LIMIT $2
            "#
        }
        (Direction::Desc, true) => {
            r#"
            SELECT id, title, author, forum, message, votes, slug, created
            FROM threads
            WHERE forum = $1 AND created <= $3
            ORDER BY created DESC, id DESC
            LIMIT $2
            "#
        }
    }
}

#[async_trait]
impl ForumStore for super::Database {
    async fn insert_forum(&self, forum: &CreateForumRequest) -> StoreResult<Forum> {
        let forum = sqlx::query_as::<_, Forum>(
            r#"
            INSERT INTO forums (slug, title, owner)
            VALUES ($1, $2, $3)
            RETURNING title, owner, slug, posts, threads
            "#,
        )
        .bind(&forum.slug)
        .bind(&forum.title)
        .bind(&forum.user)
        .fetch_one(&self.pool)
        .await?;

        Ok(forum)
    }

    async fn forum_by_slug(&self, slug: &str) -> StoreResult<Option<Forum>> {
        let forum = sqlx::query_as::<_, Forum>(
            "SELECT title, owner, slug, posts, threads FROM forums WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(forum)
    }

    async fn forum_users(&self, slug: &str, page: &UserPage) -> StoreResult<Vec<User>> {
        let sql = forum_users_sql(page.direction, page.since.is_some());
        let mut query = sqlx::query_as::<_, User>(sql).bind(slug).bind(page.limit);
        if let Some(since) = &page.since {
            query = query.bind(since);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn forum_threads(&self, slug: &str, page: &ThreadPage) -> StoreResult<Vec<Thread>> {
        let sql = forum_threads_sql(page.direction, page.since.is_some());
        let mut query = sqlx::query_as::<_, Thread>(sql).bind(slug).bind(page.limit);
        if let Some(since) = page.since {
            query = query.bind(since);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}
