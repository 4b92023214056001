//! Convenience result type alias for CampusBell.

use crate::error::AppError;

/// A specialized `Result` type for CampusBell operations.
pub type AppResult<T> = Result<T, AppError>;
