use crate::error::{AppError, Result};
use crate::models::{Thread, ThreadRef, ThreadUpdate, Vote};
use crate::store::{ThreadStore, Violation};

use super::Engine;

impl Engine {
    pub async fn thread(&self, thread: &ThreadRef) -> Result<Thread> {
        self.resolve_thread(thread).await
    }

    /// Apply the non-empty fields of `update`
    pub async fn update_thread(&self, thread: &ThreadRef, update: ThreadUpdate) -> Result<Thread> {
        let current = self.resolve_thread(thread).await?;
        if update.is_empty() {
            return Ok(current);
        }

        match self.store.update_thread(current.id, &update).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(AppError::NotFound(format!("Can't find thread by {}", thread))),
            Err(e) if e.violation() == Some(Violation::MissingReference) => Err(
                AppError::ReferenceNotFound("Can't find new thread author or forum".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Record or replace a user's voice and return the re-tallied thread.
    ///
    /// A first vote is an insert; a repeated vote hits the unique key and
    /// becomes an update of the stored voice.
    pub async fn vote(&self, thread: &ThreadRef, vote: Vote) -> Result<Thread> {
        let target = self.resolve_thread(thread).await?;

        let missing_voter = || {
            AppError::ReferenceNotFound(format!("Can't find user by nickname: {}", vote.nickname))
        };
        match self.store.insert_vote(target.id, &vote).await {
            Ok(()) => {}
            Err(e) => match e.violation() {
                Some(Violation::UniqueConflict) => {
                    if !self.store.update_vote(target.id, &vote).await? {
                        // Vote vanished between the two statements
                        self.store.insert_vote(target.id, &vote).await?;
                    }
                }
                Some(Violation::MissingReference) => return Err(missing_voter()),
                _ => return Err(e.into()),
            },
        }

        self.store
            .thread_by_id(target.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Can't find thread by {}", thread)))
    }
}
