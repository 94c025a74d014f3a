//! Convenience result type alias for VidShare.

use crate::error::AppError;

/// A specialized `Result` type for VidShare operations.
pub type AppResult<T> = Result<T, AppError>;
