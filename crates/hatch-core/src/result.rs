//! Convenience result type alias for hatch.

use crate::error::HatchError;

/// A specialized `Result` type for hatch operations.
pub type HatchResult<T> = Result<T, HatchError>;
