//! Comments, replies and comment likes.

use serde::{Deserialize, Serialize};
use tracing::info;

use vidshare_core::error::AppError;
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{CommentId, VideoId};
use vidshare_database::DatabasePool;
use vidshare_database::connection::commit;
use vidshare_database::repositories::{CommentRepository, OutboxRepository, VideoRepository};
use vidshare_entity::content::{Comment, Video};
use vidshare_entity::notification::NotificationKind;
use vidshare_entity::outbox::NewOutboxEntry;

use super::normalize_comment_text;
use crate::context::RequestContext;

/// Result of toggling a like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLike {
    /// Whether the caller now likes the comment.
    pub liked: bool,
    /// The comment with its updated like count.
    pub comment: Comment,
}

/// Entry telling a video's creator about a new comment on it.
pub fn comment_entry(
    ctx: &RequestContext,
    video: &Video,
    comment: &Comment,
) -> Option<NewOutboxEntry> {
    NewOutboxEntry::between(NotificationKind::Comment, ctx.user_id, video.creator_id)
        .map(|entry| entry.with_video(video.id).with_comment(comment.id))
}

/// Entry telling a comment's author that someone replied.
///
/// References the parent comment so the author can tell which of their
/// comments got the reply.
pub fn reply_entry(ctx: &RequestContext, parent: &Comment) -> Option<NewOutboxEntry> {
    NewOutboxEntry::between(NotificationKind::Reply, ctx.user_id, parent.author_id)
        .map(|entry| entry.with_video(parent.video_id).with_comment(parent.id))
}

/// Entry telling a comment's author about a new like. Unlikes are silent.
pub fn like_entry(ctx: &RequestContext, target: &Comment, liked: bool) -> Option<NewOutboxEntry> {
    if !liked {
        return None;
    }
    NewOutboxEntry::between(NotificationKind::Like, ctx.user_id, target.author_id)
        .map(|entry| entry.with_video(target.video_id).with_comment(target.id))
}

/// Creates comments and replies and toggles likes.
#[derive(Debug, Clone)]
pub struct CommentService {
    db: DatabasePool,
    videos: VideoRepository,
    comments: CommentRepository,
    outbox: OutboxRepository,
}

impl CommentService {
    /// Creates a new comment service.
    pub fn new(
        db: DatabasePool,
        videos: VideoRepository,
        comments: CommentRepository,
        outbox: OutboxRepository,
    ) -> Self {
        Self {
            db,
            videos,
            comments,
            outbox,
        }
    }

    /// Comment on a video. The video's creator is notified.
    pub async fn comment_on_video(
        &self,
        ctx: &RequestContext,
        video_id: VideoId,
        text: &str,
    ) -> AppResult<Comment> {
        let text = normalize_comment_text(text)?;
        let video = self
            .videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::not_found("Video not found"))?;

        let mut tx = self.db.begin().await?;
        let comment = self
            .comments
            .create(&mut tx, video.id, ctx.user_id, None, text)
            .await?;
        if let Some(entry) = comment_entry(ctx, &video, &comment) {
            self.outbox.enqueue(&mut tx, &entry).await?;
        }
        commit(tx).await?;

        info!(
            comment_id = %comment.id,
            video_id = %video.id,
            author_id = %ctx.user_id,
            "Comment created"
        );
        Ok(comment)
    }

    /// Reply to a comment. The parent comment's author is notified.
    pub async fn reply_to_comment(
        &self,
        ctx: &RequestContext,
        parent_id: CommentId,
        text: &str,
    ) -> AppResult<Comment> {
        let text = normalize_comment_text(text)?;
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))?;

        let mut tx = self.db.begin().await?;
        let reply = self
            .comments
            .create(&mut tx, parent.video_id, ctx.user_id, Some(parent.id), text)
            .await?;
        if let Some(entry) = reply_entry(ctx, &parent) {
            self.outbox.enqueue(&mut tx, &entry).await?;
        }
        commit(tx).await?;

        info!(
            comment_id = %reply.id,
            parent_id = %parent.id,
            author_id = %ctx.user_id,
            "Reply created"
        );
        Ok(reply)
    }

    /// Like or unlike a comment. Only a new like notifies the author.
    pub async fn toggle_like(
        &self,
        ctx: &RequestContext,
        comment_id: CommentId,
    ) -> AppResult<CommentLike> {
        let target = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))?;

        let mut tx = self.db.begin().await?;
        let (liked, comment) = self
            .comments
            .toggle_like(&mut tx, target.id, ctx.user_id)
            .await?;
        if let Some(entry) = like_entry(ctx, &target, liked) {
            self.outbox.enqueue(&mut tx, &entry).await?;
        }
        commit(tx).await?;

        info!(
            comment_id = %comment.id,
            user_id = %ctx.user_id,
            liked,
            like_count = comment.like_count,
            "Comment like toggled"
        );
        Ok(CommentLike { liked, comment })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vidshare_core::types::id::{UserId, VideoId};

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

    fn comment_by(author_id: UserId, video_id: VideoId, parent_id: Option<CommentId>) -> Comment {
        Comment {
            id: CommentId::new(),
            video_id,
            author_id,
            parent_id,
            text: "nice".into(),
            like_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_comment_notifies_creator_with_both_refs() {
        let ann = UserId::new();
        let bob = RequestContext::new(UserId::new(), "bob");
        let video = video_by(ann);
        let comment = comment_by(bob.user_id, video.id, None);

        let entry = comment_entry(&bob, &video, &comment).expect("entry");
        assert_eq!(entry.kind, NotificationKind::Comment);
        assert_eq!(entry.sender_id, bob.user_id);
        assert_eq!(entry.recipient_id, ann);
        assert_eq!(entry.video_id, Some(video.id));
        assert_eq!(entry.comment_id, Some(comment.id));
        assert!(entry.message.is_none());
    }

    #[test]
    fn test_comment_on_own_video_is_silent() {
        let ann = RequestContext::new(UserId::new(), "ann");
        let video = video_by(ann.user_id);
        let comment = comment_by(ann.user_id, video.id, None);
        assert!(comment_entry(&ann, &video, &comment).is_none());
    }

    #[test]
    fn test_reply_references_the_parent_comment() {
        let ann = UserId::new();
        let bob = RequestContext::new(UserId::new(), "bob");
        let parent = comment_by(ann, VideoId::new(), None);

        let entry = reply_entry(&bob, &parent).expect("entry");
        assert_eq!(entry.kind, NotificationKind::Reply);
        assert_eq!(entry.recipient_id, ann);
        assert_eq!(entry.video_id, Some(parent.video_id));
        assert_eq!(entry.comment_id, Some(parent.id));
    }

    #[test]
    fn test_reply_to_own_comment_is_silent() {
        let ann = RequestContext::new(UserId::new(), "ann");
        let parent = comment_by(ann.user_id, VideoId::new(), None);
        assert!(reply_entry(&ann, &parent).is_none());
    }

    #[test]
    fn test_only_a_new_like_notifies() {
        let ann = UserId::new();
        let bob = RequestContext::new(UserId::new(), "bob");
        let target = comment_by(ann, VideoId::new(), None);

        let entry = like_entry(&bob, &target, true).expect("entry");
        assert_eq!(entry.kind, NotificationKind::Like);
        assert_eq!(entry.comment_id, Some(target.id));
        assert!(like_entry(&bob, &target, false).is_none());

        let own = RequestContext::new(ann, "ann");
        assert!(like_entry(&own, &target, true).is_none());
    }
}
