//! Comment repository.

use sqlx::{PgPool, Postgres, Transaction};

use vidshare_core::error::{AppError, ErrorKind};
use vidshare_core::result::AppResult;
use vidshare_core::types::id::{CommentId, UserId, VideoId};
use vidshare_entity::content::Comment;

/// Repository for comments, replies and comment likes.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: CommentId) -> AppResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find comment", e))
    }

    /// Insert a comment, or a reply when `parent_id` is set.
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        video_id: VideoId,
        author_id: UserId,
        parent_id: Option<CommentId>,
        text: &str,
    ) -> AppResult<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, video_id, author_id, parent_id, text) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(CommentId::new())
        .bind(video_id)
        .bind(author_id)
        .bind(parent_id)
        .bind(text)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create comment", e))
    }

    /// Like the comment if the user has not, unlike it otherwise.
    ///
    /// Returns whether the comment is now liked, with the updated row.
    pub async fn toggle_like(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        comment_id: CommentId,
        user_id: UserId,
    ) -> AppResult<(bool, Comment)> {
        let unliked =
            sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unlike", e))?
                .rows_affected()
                == 1;

        let delta = if unliked {
            -1_i64
        } else {
            let inserted = sqlx::query(
                "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to like", e))?
            .rows_affected()
                == 1;

            if !inserted {
                return Err(AppError::conflict("Like was changed concurrently"));
            }
            1_i64
        };

        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET like_count = GREATEST(like_count + $2, 0) \
             WHERE id = $1 RETURNING *",
        )
        .bind(comment_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update like count", e))?;

        Ok((!unliked, comment))
    }
}
