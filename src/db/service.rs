use async_trait::async_trait;

use crate::models::Status;
use crate::store::{ServiceStore, StoreResult};

#[async_trait]
impl ServiceStore for super::Database {
    async fn status(&self) -> StoreResult<Status> {
        let status = sqlx::query_as::<_, Status>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS "user",
                (SELECT COUNT(*) FROM forums) AS forum,
                (SELECT COUNT(*) FROM threads) AS thread,
                (SELECT COUNT(*) FROM posts) AS post
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(status)
    }

    async fn clear(&self) -> StoreResult<()> {
        sqlx::query("TRUNCATE votes, posts, forum_users, threads, forums, users")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
