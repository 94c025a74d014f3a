//! User directory repository: accounts, follow graph and presence flag.

use sqlx::{PgPool, Postgres, Transaction};

use vidshare_core::error::{AppError, ErrorKind};
use vidshare_core::result::AppResult;
use vidshare_core::types::id::UserId;
use vidshare_entity::user::{User, UserSummary};

/// Repository for user records and follow edges.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Public summary of a user.
    pub async fn find_summary(&self, id: UserId) -> AppResult<Option<UserSummary>> {
        sqlx::query_as::<_, UserSummary>("SELECT id, username, profile_pic FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Create an account record.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        profile_pic: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, profile_pic) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(UserId::new())
        .bind(username)
        .bind(email)
        .bind(profile_pic)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user", e))
    }

    /// Write the presence flag. Returns false when the user does not exist.
    pub async fn set_online(&self, id: UserId, is_online: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET is_online = $2 WHERE id = $1")
            .bind(id)
            .bind(is_online)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update presence flag", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `follower` currently follows `followee`.
    pub async fn is_following(&self, follower: UserId, followee: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower)
        .bind(followee)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check follow", e))
    }

    /// Insert a follow edge. Returns false if it already existed.
    pub async fn insert_follow(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        follower: UserId,
        followee: UserId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(followee)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert follow", e))?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete a follow edge. Returns false if there was none.
    pub async fn delete_follow(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        follower: UserId,
        followee: UserId,
    ) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower)
                .bind(followee)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete follow", e)
                })?;
        Ok(result.rows_affected() == 1)
    }

    /// Number of followers of a user.
    pub async fn follower_count(&self, id: UserId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE followee_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count followers", e))
    }

    /// Clear every presence flag. Used at startup, when no connection can exist yet.
    pub async fn reset_presence(&self) -> AppResult<u64> {
        let result = sqlx::query("UPDATE users SET is_online = FALSE WHERE is_online")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset presence", e))?;
        Ok(result.rows_affected())
    }
}
