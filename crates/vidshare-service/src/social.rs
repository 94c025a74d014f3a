//! Follow graph actions.

use tracing::info;

use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::UserId;
use vidshare_database::DatabasePool;
use vidshare_database::connection::commit;
use vidshare_database::repositories::{OutboxRepository, UserRepository};
use vidshare_entity::notification::NotificationKind;
use vidshare_entity::outbox::NewOutboxEntry;

use crate::context::RequestContext;

/// Message shown to a user when someone follows them.
pub fn follow_message(username: &str) -> String {
    format!("{username} has followed you.")
}

/// Entry telling `target` they gained a follower.
pub fn follow_entry(ctx: &RequestContext, target: UserId) -> Option<NewOutboxEntry> {
    NewOutboxEntry::between(NotificationKind::Follow, ctx.user_id, target)
        .map(|entry| entry.with_message(follow_message(&ctx.username)))
}

/// Follows and unfollows users.
#[derive(Debug, Clone)]
pub struct SocialService {
    db: DatabasePool,
    users: UserRepository,
    outbox: OutboxRepository,
}

impl SocialService {
    /// Creates a new social service.
    pub fn new(db: DatabasePool, users: UserRepository, outbox: OutboxRepository) -> Self {
        Self { db, users, outbox }
    }

    /// Follow `target`. The target is notified.
    pub async fn follow(&self, ctx: &RequestContext, target: UserId) -> AppResult<()> {
        if target == ctx.user_id {
            return Err(AppError::validation("You cannot follow yourself"));
        }
        self.users
            .find_by_id(target)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let mut tx = self.db.begin().await?;
        if !self.users.insert_follow(&mut tx, ctx.user_id, target).await? {
            return Err(AppError::conflict("You are already following this user"));
        }
        if let Some(entry) = follow_entry(ctx, target) {
            self.outbox.enqueue(&mut tx, &entry).await?;
        }
        commit(tx).await?;

        info!(follower_id = %ctx.user_id, followee_id = %target, "User followed");
        Ok(())
    }

    /// Stop following `target`. Nobody is notified.
    pub async fn unfollow(&self, ctx: &RequestContext, target: UserId) -> AppResult<()> {
        if target == ctx.user_id {
            return Err(AppError::validation("You cannot unfollow yourself"));
        }

        let mut tx = self.db.begin().await?;
        if !self.users.delete_follow(&mut tx, ctx.user_id, target).await? {
            return Err(AppError::validation("You are not following this user"));
        }
        commit(tx).await?;

        info!(follower_id = %ctx.user_id, followee_id = %target, "User unfollowed");
        Ok(())
    }
}
