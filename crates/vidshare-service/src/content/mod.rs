//! Comment, like, reaction and view actions.

pub mod comment;
pub mod video;

pub use comment::{CommentLike, CommentService};
pub use video::{ReactionOutcome, VideoService};

use vidshare_core::error::AppError;

/// Longest accepted comment body, in characters.
pub const MAX_COMMENT_CHARS: usize = 2000;

/// Trim a comment body and check it is non-empty and not too long.
pub fn normalize_comment_text(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Comment text is required"));
    }
    if trimmed.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation(format!(
            "Comment text must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(trimmed)
}
