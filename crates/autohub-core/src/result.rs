//! Convenience result type alias for AutoHub.

use crate::error::AppError;

/// A specialized `Result` type for AutoHub operations.
///
/// Every crate uses this alias instead of writing `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
