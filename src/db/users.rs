use async_trait::async_trait;

use crate::models::{User, UserProfile};
use crate::store::{StoreResult, UserStore};

#[async_trait]
impl UserStore for super::Database {
    async fn insert_user(&self, user: &User) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (nickname, fullname, about, email)
            VALUES ($1, $2, $3, $4)
            RETURNING nickname, fullname, about, email
            "#,
        )
        .bind(&user.nickname)
        .bind(&user.fullname)
        .bind(&user.about)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT nickname, fullname, about, email FROM users WHERE nickname = $1",
        )
        .bind(nickname)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn users_by_nickname_or_email(
        &self,
        nickname: &str,
        email: &str,
    ) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT nickname, fullname, about, email
            FROM users
            WHERE nickname = $1 OR email = $2
            ORDER BY nickname COLLATE "C"
            "#,
        )
        .bind(nickname)
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_user(
        &self,
        nickname: &str,
        profile: &UserProfile,
    ) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                fullname = COALESCE(NULLIF($2, ''), fullname),
                about = COALESCE(NULLIF($3, ''), about),
                email = COALESCE(NULLIF($4, ''), email)
            WHERE nickname = $1
            RETURNING nickname, fullname, about, email
            "#,
        )
        .bind(nickname)
        .bind(&profile.fullname)
        .bind(&profile.about)
        .bind(&profile.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
