//! Video reactions and views.

use serde::{Deserialize, Serialize};
use tracing::info;

use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::VideoId;
use vidshare_database::DatabasePool;
use vidshare_database::connection::commit;
use vidshare_database::repositories::{OutboxRepository, VideoRepository};
use vidshare_entity::content::{ReactionToggle, ReactionType, Video};
use vidshare_entity::notification::NotificationKind;
use vidshare_entity::outbox::NewOutboxEntry;

use crate::context::RequestContext;

/// Result of toggling a reaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionOutcome {
    /// What happened to the caller's reaction.
    #[serde(flatten)]
    pub toggle: ReactionToggle,
    /// Total reactions on the video afterwards.
    pub reaction_count: i64,
}

/// Message shown to a creator when someone reacts to their video.
pub fn reaction_message(username: &str, reaction: ReactionType) -> String {
    format!("{username} reacted to your video with {reaction}.")
}

/// Entry telling a video's creator about a reaction. Removals are silent.
pub fn reaction_entry(
    ctx: &RequestContext,
    video: &Video,
    toggle: ReactionToggle,
) -> Option<NewOutboxEntry> {
    let ReactionToggle::Added { reaction } = toggle else {
        return None;
    };
    NewOutboxEntry::between(NotificationKind::Reaction, ctx.user_id, video.creator_id).map(
        |entry| {
            entry
                .with_video(video.id)
                .with_message(reaction_message(&ctx.username, reaction))
        },
    )
}

/// Toggles reactions and counts views.
#[derive(Debug, Clone)]
pub struct VideoService {
    db: DatabasePool,
    videos: VideoRepository,
    outbox: OutboxRepository,
}

impl VideoService {
    /// Creates a new video service.
    pub fn new(db: DatabasePool, videos: VideoRepository, outbox: OutboxRepository) -> Self {
        Self { db, videos, outbox }
    }

    /// Add or remove the caller's reaction of the given type.
    ///
    /// Adding notifies the creator; removing is silent.
    pub async fn toggle_reaction(
        &self,
        ctx: &RequestContext,
        video_id: VideoId,
        reaction: ReactionType,
    ) -> AppResult<ReactionOutcome> {
        let video = self
            .videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))?;

        let mut tx = self.db.begin().await?;
        let (toggle, updated) = self
            .videos
            .toggle_reaction(&mut tx, video.id, ctx.user_id, reaction)
            .await?;
        if let Some(entry) = reaction_entry(ctx, &video, toggle) {
            self.outbox.enqueue(&mut tx, &entry).await?;
        }
        commit(tx).await?;

        info!(
            video_id = %video.id,
            user_id = %ctx.user_id,
            reaction = %reaction,
            added = toggle.is_added(),
            reaction_count = updated.reaction_count,
            "Reaction toggled"
        );
        Ok(ReactionOutcome {
            toggle,
            reaction_count: updated.reaction_count,
        })
    }

    /// Count one view.
    pub async fn record_view(&self, video_id: VideoId) -> AppResult<Video> {
        self.videos
            .increment_views(video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vidshare_core::types::id::UserId;

    use super::*;

    fn video_by(creator_id: UserId) -> Video {
        Video {
            id: VideoId::new(),
            creator_id,
            title: "clip".into(),
            views: 0,
            reaction_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_added_reaction_notifies_creator_with_message() {
        let video = video_by(UserId::new());
        let bob = RequestContext::new(UserId::new(), "bob");
        let entry = reaction_entry(
            &bob,
            &video,
            ReactionToggle::Added {
                reaction: ReactionType::Love,
            },
        )
        .expect("entry");

        assert_eq!(entry.kind, NotificationKind::Reaction);
        assert_eq!(entry.recipient_id, video.creator_id);
        assert_eq!(entry.video_id, Some(video.id));
        assert!(entry.comment_id.is_none());
        assert_eq!(
            entry.message.as_deref(),
            Some("bob reacted to your video with love.")
        );
    }

    #[test]
    fn test_removed_or_own_reaction_is_silent() {
        let ann = RequestContext::new(UserId::new(), "ann");
        let video = video_by(UserId::new());
        let removed = ReactionToggle::Removed {
            reaction: ReactionType::Like,
        };
        assert!(reaction_entry(&ann, &video, removed).is_none());

        let own = video_by(ann.user_id);
        let added = ReactionToggle::Added {
            reaction: ReactionType::Like,
        };
        assert!(reaction_entry(&ann, &own, added).is_none());
    }

    #[test]
    fn test_reaction_message() {
        assert_eq!(
            reaction_message("ann", ReactionType::Haha),
            "ann reacted to your video with haha."
        );
    }

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = ReactionOutcome {
            toggle: ReactionToggle::Removed {
                reaction: ReactionType::Love,
            },
            reaction_count: 3,
        };
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(json["status"], "removed");
        assert_eq!(json["reaction"], "love");
        assert_eq!(json["reactionCount"], 3);
    }
}
