//! In-memory notification ledger.
//!
//! Mirrors the PostgreSQL ledger closely enough to test dispatch, listing and
//! read marking without a database: strictly increasing microsecond
//! timestamps, idempotent inserts, inner-join semantics on the sender.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;

use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{NotificationId, UserId};
use vidshare_core::types::pagination::PageBounds;
use vidshare_entity::notification::{NewNotification, Notification, NotificationWithSender};
use vidshare_entity::user::UserSummary;

use super::ledger::NotificationLedger;

#[derive(Debug, Default)]
struct Rows {
    items: Vec<Notification>,
    last_created_at: Option<DateTime<Utc>>,
}

/// Notification ledger held in memory.
#[derive(Debug, Default)]
pub struct MemoryNotificationLedger {
    users: DashMap<UserId, UserSummary>,
    rows: RwLock<Rows>,
    failing: AtomicBool,
}

impl MemoryNotificationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user so notifications may reference them.
    pub fn add_user(&self, summary: UserSummary) {
        self.users.insert(summary.id, summary);
    }

    /// Register a user by name and return their id.
    pub fn add_named_user(&self, username: &str) -> UserId {
        let id = UserId::new();
        self.add_user(UserSummary {
            id,
            username: username.to_string(),
            profile_pic: None,
        });
        id
    }

    /// Make subsequent inserts fail as a storage outage would.
    pub fn fail_inserts(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every stored notification, in insertion order.
    pub async fn all(&self) -> Vec<Notification> {
        self.rows.read().await.items.clone()
    }

    fn now_micros() -> DateTime<Utc> {
        let now = Utc::now();
        DateTime::<Utc>::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
    }
}

#[async_trait]
impl NotificationLedger for MemoryNotificationLedger {
    async fn insert(&self, new: NewNotification) -> AppResult<Notification> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::database("Failed to create notification"));
        }
        if !self.users.contains_key(&new.sender_id) || !self.users.contains_key(&new.recipient_id)
        {
            return Err(AppError::validation(
                "Notification references a user or content item that does not exist",
            ));
        }

        let mut rows = self.rows.write().await;
        if let Some(existing) = rows.items.iter().find(|n| n.id == new.id) {
            return Ok(existing.clone());
        }

        let now = Self::now_micros();
        let created_at = match rows.last_created_at {
            Some(last) if last >= now => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        rows.last_created_at = Some(created_at);

        let notification = new.into_notification(created_at);
        rows.items.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: UserId,
        bounds: &PageBounds,
    ) -> AppResult<Vec<NotificationWithSender>> {
        let rows = self.rows.read().await;
        let mut matching: Vec<NotificationWithSender> = rows
            .items
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .filter(|n| {
                bounds
                    .after
                    .is_none_or(|c| c.precedes(n.created_at, n.id.into_uuid()))
            })
            .filter_map(|n| {
                let sender = self.users.get(&n.sender_id)?;
                Some(NotificationWithSender {
                    notification: n.clone(),
                    sender_username: sender.username.clone(),
                    sender_profile_pic: sender.profile_pic.clone(),
                })
            })
            .collect();

        matching.sort_by(|a, b| {
            (b.notification.created_at, b.notification.id.into_uuid())
                .cmp(&(a.notification.created_at, a.notification.id.into_uuid()))
        });
        matching.truncate(usize::try_from(bounds.fetch_limit()).unwrap_or(usize::MAX));
        Ok(matching)
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        recipient_id: UserId,
    ) -> AppResult<Option<Notification>> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .items
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn count_unread(&self, recipient_id: UserId) -> AppResult<i64> {
        let rows = self.rows.read().await;
        let count = rows
            .items
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
