use thiserror::Error;

use crate::cache::CacheError;
use crate::generator::GeneratorError;

/// Errors a caller can see. Remote failures never show up here; they are
/// reported through [`SyncStatus`](super::SyncStatus) instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid meal: {0}")]
    InvalidMeal(String),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
