//! Persistence seam for the online flag.

use async_trait::async_trait;

use vidshare_core::result::AppResult;
use vidshare_core::types::id::UserId;
use vidshare_database::repositories::UserRepository;

/// Where the presence tracker writes `users.is_online`.
#[async_trait]
pub trait PresenceStore: Send + Sync + 'static {
    /// Set the user's online flag.
    async fn set_online(&self, user_id: UserId, is_online: bool) -> AppResult<()>;
}

#[async_trait]
impl PresenceStore for UserRepository {
    async fn set_online(&self, user_id: UserId, is_online: bool) -> AppResult<()> {
        let updated = UserRepository::set_online(self, user_id, is_online).await?;
        if !updated {
            tracing::debug!(user_id = %user_id, "Presence update for unknown user");
        }
        Ok(())
    }
}
