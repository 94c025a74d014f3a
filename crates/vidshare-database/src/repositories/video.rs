//! Video repository. Counters are updated with single atomic statements.

use sqlx::{PgPool, Postgres, Transaction};

use vidshare_core::error::{AppError, ErrorKind};
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{UserId, VideoId};
use vidshare_entity::content::{ReactionToggle, ReactionType, Video};

/// Repository for video metadata, views and reactions.
#[derive(Debug, Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a video by ID.
    pub async fn find_by_id(&self, id: VideoId) -> AppResult<Option<Video>> {
        sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find video", e))
    }

    /// Create a video record.
    pub async fn create(&self, creator_id: UserId, title: &str) -> AppResult<Video> {
        sqlx::query_as::<_, Video>(
            "INSERT INTO videos (id, creator_id, title) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(VideoId::new())
        .bind(creator_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create video", e))
    }

    /// Add one view. Returns the updated video, or `None` if it does not exist.
    pub async fn increment_views(&self, id: VideoId) -> AppResult<Option<Video>> {
        sqlx::query_as::<_, Video>("UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record view", e))
    }

    /// Add the reaction if the user does not hold it, remove it otherwise,
    /// and move `reaction_count` by one in the same transaction.
    pub async fn toggle_reaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        video_id: VideoId,
        user_id: UserId,
        reaction: ReactionType,
    ) -> AppResult<(ReactionToggle, Video)> {
        let removed = sqlx::query(
            "DELETE FROM video_reactions WHERE video_id = $1 AND user_id = $2 AND reaction = $3",
        )
        .bind(video_id)
        .bind(user_id)
        .bind(reaction)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove reaction", e))?
        .rows_affected()
            == 1;

        let (toggle, delta) = if removed {
            (ReactionToggle::Removed { reaction }, -1_i64)
        } else {
            let inserted = sqlx::query(
                "INSERT INTO video_reactions (video_id, user_id, reaction) VALUES ($1, $2, $3) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(video_id)
            .bind(user_id)
            .bind(reaction)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add reaction", e))?
            .rows_affected()
                == 1;

            if !inserted {
                return Err(AppError::conflict("Reaction was changed concurrently"));
            }
            (ReactionToggle::Added { reaction }, 1_i64)
        };

        let video = sqlx::query_as::<_, Video>(
            "UPDATE videos SET reaction_count = GREATEST(reaction_count + $2, 0) \
             WHERE id = $1 RETURNING *",
        )
        .bind(video_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update reaction count", e)
        })?;

        Ok((toggle, video))
    }
}
