use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{CreatePostRequest, Post, Thread};
use crate::paging::{Direction, PostPage, PostSort, SortSpec};
use crate::store::{PostStore, StoreResult};

macro_rules! post_columns {
    () => {
        "id, parent, author, message, is_edited, forum, thread, created, path"
    };
}

/// Postgres caps a statement at 65535 bind parameters
const MAX_BINDS: usize = 65535;
const INSERT_BINDS_PER_POST: usize = 5;

/// Thread posts. `$1` thread id, `$2` limit, `$3` boundary post id.
///
/// A boundary id with no post makes the subquery NULL, so the page is empty.
fn thread_posts_sql(spec: SortSpec, bounded: bool) -> &'static str {
    use crate::paging::Direction::{Asc, Desc};
    use crate::paging::PostSort::{Flat, ParentTree, Tree};

    match (spec.mode, spec.direction, bounded) {
        (Flat, Asc, false) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "ORDER BY id LIMIT $2"
        ),
        (Flat, Asc, true) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "AND id > $3 ",
            "ORDER BY id LIMIT $2"
        ),
        (Flat, Desc, false) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "ORDER BY id DESC LIMIT $2"
        ),
        (Flat, Desc, true) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "AND id < $3 ",
            "ORDER BY id DESC LIMIT $2"
        ),
        (Tree, Asc, false) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "ORDER BY path, id LIMIT $2"
        ),
        (Tree, Asc, true) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "AND path > (SELECT path FROM posts WHERE id = $3) ",
            "ORDER BY path, id LIMIT $2"
        ),
        (Tree, Desc, false) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "ORDER BY path DESC, id DESC LIMIT $2"
        ),
        (Tree, Desc, true) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE thread = $1 ",
            "AND path < (SELECT path FROM posts WHERE id = $3) ",
            "ORDER BY path DESC, id DESC LIMIT $2"
        ),
        (ParentTree, Asc, false) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE path[1] IN (",
            "SELECT id FROM posts WHERE thread = $1 AND parent = 0 ",
            "ORDER BY id LIMIT $2) ",
            "ORDER BY path, id"
        ),
        (ParentTree, Asc, true) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE path[1] IN (",
            "SELECT id FROM posts WHERE thread = $1 AND parent = 0 ",
            "AND id > (SELECT path[1] FROM posts WHERE id = $3) ",
            "ORDER BY id LIMIT $2) ",
            "ORDER BY path, id"
        ),
        (ParentTree, Desc, false) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE path[1] IN (",
            "SELECT id FROM posts WHERE thread = $1 AND parent = 0 ",
            "ORDER BY id DESC LIMIT $2) ",
            "ORDER BY path[1] DESC, path, id"
        ),
        (ParentTree, Desc, true) => concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE path[1] IN (",
            "SELECT id FROM posts WHERE thread = $1 AND parent = 0 ",
            "AND id < (SELECT path[1] FROM posts WHERE id = $3) ",
            "ORDER BY id DESC LIMIT $2) ",
            "ORDER BY path[1] DESC, path, id"
        ),
    }
}

#[async_trait]
impl PostStore for super::Database {
    /// One transaction for the whole batch, so every post shares `NOW()`
    /// and a bad parent or author rolls back all of them
    async fn insert_posts(
        &self,
        thread: &Thread,
        posts: &[CreatePostRequest],
    ) -> StoreResult<Vec<Post>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(posts.len());

        for chunk in posts.chunks(MAX_BINDS / INSERT_BINDS_PER_POST) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO posts (parent, author, message, forum, thread) ");
            builder.push_values(chunk, |mut row, post| {
                row.push_bind(post.parent)
                    .push_bind(&post.author)
                    .push_bind(&post.message)
                    .push_bind(&thread.forum)
                    .push_bind(thread.id);
            });
            builder.push(concat!(" RETURNING ", post_columns!()));

            let mut rows = builder.build_query_as::<Post>().fetch_all(&mut *tx).await?;
            rows.sort_by_key(|p| p.id);
            created.extend(rows);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn post_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn thread_posts(&self, thread_id: i32, page: &PostPage) -> StoreResult<Vec<Post>> {
        let sql = thread_posts_sql(page.spec(), page.since.is_some());
        let mut query = sqlx::query_as::<_, Post>(sql).bind(thread_id).bind(page.limit);
        if let Some(since) = page.since {
            query = query.bind(since);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn update_post_message(&self, id: i64, message: &str) -> StoreResult<Option<Post>> {
        // SET expressions read the old row, so the comparison sees the previous message
        let post = sqlx::query_as::<_, Post>(concat!(
            "UPDATE posts SET is_edited = is_edited OR message <> $2, message = $2 ",
            "WHERE id = $1 RETURNING ", post_columns!()
        ))
        .bind(id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }
}
