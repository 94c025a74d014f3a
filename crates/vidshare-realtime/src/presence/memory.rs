//! In-memory presence store.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::UserId;

use super::store::PresenceStore;

/// Presence store backed by a map, recording every write in order.
#[derive(Debug, Default)]
pub struct MemoryPresenceStore {
    flags: DashMap<UserId, bool>,
    writes: Mutex<Vec<(UserId, bool)>>,
    failing: std::sync::atomic::AtomicBool,
}

impl MemoryPresenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current flag for a user; `false` if never written.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.flags.get(&user_id).map(|f| *f).unwrap_or(false)
    }

    /// Every write applied so far, oldest first.
    pub async fn writes(&self) -> Vec<(UserId, bool)> {
        self.writes.lock().await.clone()
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn set_online(&self, user_id: UserId, is_online: bool) -> AppResult<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::database("presence store unavailable"));
        }
        self.flags.insert(user_id, is_online);
        self.writes.lock().await.push((user_id, is_online));
        Ok(())
    }
}
