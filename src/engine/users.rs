use crate::error::{AppError, Result};
use crate::models::{User, UserProfile};
use crate::store::{UserStore, Violation};

use super::{Creation, Engine};

impl Engine {
    /// Create a user, or report every user already holding the nickname or email
    pub async fn create_user(
        &self,
        nickname: &str,
        profile: UserProfile,
    ) -> Result<Creation<User, Vec<User>>> {
        let user = profile.into_user(nickname);
        match self.store.insert_user(&user).await {
            Ok(created) => {
                tracing::debug!("Created user {}", created.nickname);
                Ok(Creation::Created(created))
            }
            Err(e) if e.violation() == Some(Violation::UniqueConflict) => {
                let existing = self
                    .store
                    .users_by_nickname_or_email(&user.nickname, &user.email)
                    .await?;
                tracing::debug!("User {} conflicts with {} existing", user.nickname, existing.len());
                Ok(Creation::Conflict(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn user(&self, nickname: &str) -> Result<User> {
        self.store
            .user_by_nickname(nickname)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Can't find user by nickname: {}", nickname)))
    }

    /// Apply the non-empty profile fields
    pub async fn update_user(&self, nickname: &str, profile: UserProfile) -> Result<User> {
        if profile.is_empty() {
            return self.user(nickname).await;
        }

        match self.store.update_user(nickname, &profile).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AppError::NotFound(format!(
                "Can't find user by nickname: {}",
                nickname
            ))),
            Err(e) if e.violation() == Some(Violation::UniqueConflict) => Err(AppError::Conflict(
                format!("Email {} is already registered by another user", profile.email),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
