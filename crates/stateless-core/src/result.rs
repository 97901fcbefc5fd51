//! Convenience result type alias for Stateless Media.

use crate::error::AppError;

/// A specialized `Result` type for Stateless operations.
pub type AppResult<T> = Result<T, AppError>;
